// src/services/journal_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{rls_violation, GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::JournalRepository,
    models::{
        identity::Caller,
        journal::{JournalEntry, JournalPayload},
    },
};

const TABLE: Table = Table::JournalEntries;

#[derive(Clone)]
pub struct JournalService {
    repo: JournalRepository,
    policies: Arc<PolicySet>,
}

impl JournalService {
    pub fn new(repo: JournalRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    // Só as entradas do próprio chamador
    pub async fn list(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Vec<JournalEntry>, AppError> {
        let entries = self.repo.list(&mut *conn).await?;
        Ok(self.policies.visible(caller, entries))
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        payload: &JournalPayload,
    ) -> Result<JournalEntry, AppError> {
        let owner = caller.user_id();
        self.policies
            .authorize_insert(TABLE, caller, &RowFacts::owned_by(owner))
            .ensure(TABLE)?;

        let Some(owner) = owner else {
            return Err(rls_violation(TABLE));
        };
        self.repo.create(&mut *conn, owner, payload).await
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        payload: &JournalPayload,
    ) -> Result<JournalEntry, AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_update(TABLE, caller, &existing.facts(), &existing.facts())
            .ensure(TABLE)?;
        self.repo.update(&mut *conn, id, payload).await
    }

    pub async fn delete(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_delete(TABLE, caller, &existing.facts())
            .ensure(TABLE)?;

        if !self.repo.delete(&mut *conn, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn lock_visible(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<JournalEntry, AppError> {
        self.repo
            .find_for_update(&mut *conn, id)
            .await?
            .filter(|entry| self.policies.can_read(caller, entry))
            .ok_or(AppError::NotFound)
    }
}
