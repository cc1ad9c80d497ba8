// src/db/journal_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::journal::{JournalEntry, JournalPayload},
};

const ENTRY_COLUMNS: &str = "id, user_id, title, content, entry_date, created_at, updated_at";

#[derive(Clone, Default)]
pub struct JournalRepository;

impl JournalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<JournalEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM journal_entries ORDER BY entry_date DESC, created_at DESC"
        );
        let entries = sqlx::query_as::<_, JournalEntry>(&sql).fetch_all(executor).await?;
        Ok(entries)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<JournalEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1 FOR UPDATE");
        let entry = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    pub async fn create<'e, E>(&self, executor: E, owner: Uuid, payload: &JournalPayload) -> Result<JournalEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO journal_entries (user_id, title, content, entry_date)
            VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE))
            RETURNING {ENTRY_COLUMNS}
            "#
        );
        let entry = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(owner)
            .bind(payload.title.trim())
            .bind(&payload.content)
            .bind(payload.entry_date)
            .fetch_one(executor)
            .await?;
        Ok(entry)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &JournalPayload) -> Result<JournalEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE journal_entries SET
                title = $2,
                content = $3,
                entry_date = COALESCE($4, entry_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        );
        let entry = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(id)
            .bind(payload.title.trim())
            .bind(&payload.content)
            .bind(payload.entry_date)
            .fetch_one(executor)
            .await?;
        Ok(entry)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
