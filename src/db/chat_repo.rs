// src/db/chat_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::chat::ChatMessage};

#[derive(Clone, Default)]
pub struct ChatRepository;

impl ChatRepository {
    pub fn new() -> Self {
        Self
    }

    /// As `limit` mensagens mais recentes, em ordem cronológica.
    pub async fn recent<'e, E>(&self, executor: E, limit: i64) -> Result<Vec<ChatMessage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, sender_id, content, created_at FROM (
                SELECT id, sender_id, content, created_at
                FROM chat_messages
                ORDER BY created_at DESC
                LIMIT $1
            ) recent
            ORDER BY created_at
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(messages)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ChatMessage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let message = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, sender_id, content, created_at FROM chat_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(message)
    }

    pub async fn create<'e, E>(&self, executor: E, sender_id: Uuid, content: &str) -> Result<ChatMessage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (sender_id, content)
            VALUES ($1, $2)
            RETURNING id, sender_id, content, created_at
            "#,
        )
        .bind(sender_id)
        .bind(content)
        .fetch_one(executor)
        .await?;
        Ok(message)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
