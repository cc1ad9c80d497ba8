// src/services/calendar_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{rls_violation, GovernedRow, PolicySet, Table},
    common::error::AppError,
    db::CalendarRepository,
    models::{
        calendar::{CalendarEvent, EventDraft, EventRangeQuery},
        identity::Caller,
    },
};

const TABLE: Table = Table::CalendarEvents;

#[derive(Clone)]
pub struct CalendarService {
    repo: CalendarRepository,
    policies: Arc<PolicySet>,
}

impl CalendarService {
    pub fn new(repo: CalendarRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    /// Eventos próprios mais os coletivos da equipe.
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        range: &EventRangeQuery,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let events = self.repo.list(&mut *conn, range.from, range.to).await?;
        Ok(self.policies.visible(caller, events))
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        draft: EventDraft,
    ) -> Result<CalendarEvent, AppError> {
        // O dono é sempre o chamador
        let owner = caller.user_id();
        self.policies
            .authorize_insert(TABLE, caller, &draft.facts_for(owner))
            .ensure(TABLE)?;

        let Some(owner) = owner else {
            return Err(rls_violation(TABLE));
        };

        self.repo.create(&mut *conn, owner, &draft).await
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        draft: EventDraft,
    ) -> Result<CalendarEvent, AppError> {
        let existing = self.lock_visible(conn, caller, id).await?;
        self.policies
            .authorize_update(TABLE, caller, &existing.facts(), &draft.facts_for(Some(existing.user_id)))
            .ensure(TABLE)?;

        self.repo.update(&mut *conn, id, &draft).await
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

    async fn lock_visible(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
    ) -> Result<CalendarEvent, AppError> {
        self.repo
            .find_for_update(&mut *conn, id)
            .await?
            .filter(|event| self.policies.can_read(caller, event))
            .ok_or(AppError::NotFound)
    }
}
