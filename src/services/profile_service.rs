// src/services/profile_service.rs

use std::sync::Arc;

use sqlx::PgConnection;

use crate::{
    access::{rls_violation, GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::ProfileRepository,
    models::{
        identity::Caller,
        profile::{Profile, ProfilePayload},
    },
};

const TABLE: Table = Table::Profiles;

#[derive(Clone)]
pub struct ProfileService {
    repo: ProfileRepository,
    policies: Arc<PolicySet>,
}

impl ProfileService {
    pub fn new(repo: ProfileRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    // Diretório da equipe
    pub async fn list(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Vec<Profile>, AppError> {
        let profiles = self.repo.list(&mut *conn).await?;
        Ok(self.policies.visible(caller, profiles))
    }

    pub async fn me(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Profile, AppError> {
        let Some(user_id) = caller.user_id() else {
            return Err(AppError::NotFound);
        };

        self.repo
            .find_by_id(&mut *conn, user_id)
            .await?
            .filter(|profile| self.policies.can_read(caller, profile))
            .ok_or(AppError::NotFound)
    }

    /// Cria ou substitui o perfil do próprio chamador.
    pub async fn save_me(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        payload: ProfilePayload,
    ) -> Result<Profile, AppError> {
        let user_id = caller.user_id();
        let proposed = RowFacts::owned_by(user_id);

        let existing = match user_id {
            Some(id) => self.repo.find_by_id(&mut *conn, id).await?,
            None => None,
        };

        let decision = match &existing {
            Some(current) => self.policies.authorize_update(TABLE, caller, &current.facts(), &proposed),
            None => self.policies.authorize_insert(TABLE, caller, &proposed),
        };
        decision.ensure(TABLE)?;

        let Some(user_id) = user_id else {
            return Err(rls_violation(TABLE));
        };

        let email = payload
            .email
            .or_else(|| existing.map(|p| p.email))
            .or_else(|| caller.email().map(str::to_string))
            .ok_or(AppError::InvalidField { field: "email", code: "required" })?;

        self.repo
            .upsert(
                &mut *conn,
                user_id,
                &email,
                payload.full_name.as_deref(),
                payload.role,
                payload.avatar_url.as_deref(),
            )
            .await
    }
}
