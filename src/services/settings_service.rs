// src/services/settings_service.rs

use std::sync::Arc;

use sqlx::PgConnection;

use crate::{
    access::{GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::SettingsRepository,
    models::{
        identity::Caller,
        settings::{UpdateSettingsRequest, UserSettings},
    },
};

const TABLE: Table = Table::UserSettings;

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    policies: Arc<PolicySet>,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    /// Preferências do chamador (padrões se nunca salvou). Anônimo não tem preferências.
    pub async fn get(&self, conn: &mut PgConnection, caller: &Caller) -> Result<UserSettings, AppError> {
        let Some(user_id) = caller.user_id() else {
            return Err(AppError::NotFound);
        };

        let settings = self.repo.get_settings(&mut *conn, user_id).await?;
        if self.policies.can_read(caller, &settings) {
            Ok(settings)
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        changes: UpdateSettingsRequest,
    ) -> Result<UserSettings, AppError> {
        let Some(user_id) = caller.user_id() else {
            self.policies
                .authorize_insert(TABLE, caller, &RowFacts::owned_by(None))
                .ensure(TABLE)?;
            return Err(AppError::NotFound);
        };

        let current = self.repo.get_settings(&mut *conn, user_id).await?;
        let persisted = current.updated_at.is_some();
        let merged = current.clone().merged(changes)?;

        let decision = if persisted {
            self.policies.authorize_update(TABLE, caller, &current.facts(), &merged.facts())
        } else {
            self.policies.authorize_insert(TABLE, caller, &merged.facts())
        };
        decision.ensure(TABLE)?;

        let saved = self.repo.save_settings(&mut *conn, &merged).await?;
        tracing::debug!(%user_id, "Preferências salvas");
        Ok(saved)
    }
}
