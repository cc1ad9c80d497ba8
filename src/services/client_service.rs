// src/services/client_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::ClientRepository,
    models::{
        crm::{Client, ClientDraft, ClientView},
        identity::Caller,
    },
    valuation::{DealQuote, DealTerms},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    policies: Arc<PolicySet>,
}

impl ClientService {
    pub fn new(repo: ClientRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    pub async fn list(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Vec<ClientView>, AppError> {
        let clients = self.repo.list(&mut *conn).await?;
        Ok(self
            .policies
            .visible(caller, clients)
            .into_iter()
            .map(ClientView::from)
            .collect())
    }

    pub async fn get(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<ClientView, AppError> {
        self.find_visible(conn, caller, id).await.map(ClientView::from)
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        draft: ClientDraft,
    ) -> Result<ClientView, AppError> {
        self.policies
            .authorize_insert(Table::Clients, caller, &draft.facts())
            .ensure(Table::Clients)?;

        let client = self.repo.create(&mut *conn, &draft).await?;
        tracing::info!(client_id = %client.id, "Cliente criado");
        Ok(client.into())
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        draft: ClientDraft,
    ) -> Result<ClientView, AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_update(Table::Clients, caller, &existing.facts(), &draft.facts())
            .ensure(Table::Clients)?;

        let client = self.repo.update(&mut *conn, id, &draft).await?;
        Ok(client.into())
    }

    pub async fn delete(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_delete(Table::Clients, caller, &existing.facts())
            .ensure(Table::Clients)?;

        if !self.repo.delete(&mut *conn, id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(client_id = %id, "Cliente removido");
        Ok(())
    }

    /// Troca o dono do cliente (`None` = sem dono).
    pub async fn transfer(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        new_owner: Option<Uuid>,
    ) -> Result<ClientView, AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_update(Table::Clients, caller, &existing.facts(), &RowFacts::owned_by(new_owner))
            .ensure(Table::Clients)?;

        let client = self.repo.set_owner(&mut *conn, id, new_owner).await?;
        tracing::info!(
            client_id = %id,
            from = ?existing.assigned_to,
            to = ?new_owner,
            "Cliente transferido"
        );
        Ok(client.into())
    }

    pub async fn deal_value(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<DealQuote, AppError> {
        let client = self.find_visible(conn, caller, id).await?;
        Ok(DealQuote::from(client.deal_terms()))
    }

    // Não toca no banco
    pub fn quote(&self, terms: DealTerms) -> DealQuote {
        DealQuote::from(terms)
    }

    /// Cliente que o chamador pode ler; invisível e inexistente dão o mesmo 404.
    pub(crate) async fn find_visible(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
    ) -> Result<Client, AppError> {
        self.repo
            .find_by_id(&mut *conn, id)
            .await?
            .filter(|client| self.policies.can_read(caller, client))
            .ok_or(AppError::NotFound)
    }

    async fn lock_visible(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_for_update(&mut *conn, id)
            .await?
            .filter(|client| self.policies.can_read(caller, client))
            .ok_or(AppError::NotFound)
    }
}
