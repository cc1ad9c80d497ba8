// src/db/calendar_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::calendar::{CalendarEvent, EventDraft},
};

const EVENT_COLUMNS: &str =
    "id, user_id, title, description, start_time, end_time, is_collective, created_at, updated_at";

#[derive(Clone, Default)]
pub struct CalendarRepository;

impl CalendarRepository {
    pub fn new() -> Self {
        Self
    }

    /// Eventos que se sobrepõem à janela. Limites ausentes não filtram.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<CalendarEvent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM calendar_events
            WHERE ($1::timestamptz IS NULL OR end_time >= $1)
              AND ($2::timestamptz IS NULL OR start_time <= $2)
            ORDER BY start_time
            "#
        );
        let events = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(executor)
            .await?;
        Ok(events)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<CalendarEvent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = $1 FOR UPDATE");
        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(event)
    }

    pub async fn create<'e, E>(&self, executor: E, owner: Uuid, draft: &EventDraft) -> Result<CalendarEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO calendar_events (user_id, title, description, start_time, end_time, is_collective)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(owner)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(draft.is_collective)
            .fetch_one(executor)
            .await?;
        Ok(event)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, draft: &EventDraft) -> Result<CalendarEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE calendar_events SET
                title = $2,
                description = $3,
                start_time = $4,
                end_time = $5,
                is_collective = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(draft.is_collective)
            .fetch_one(executor)
            .await?;
        Ok(event)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
