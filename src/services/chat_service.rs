// src/services/chat_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{rls_violation, GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::ChatRepository,
    models::{chat::ChatMessage, identity::Caller},
};

const TABLE: Table = Table::ChatMessages;
pub const HISTORY_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct ChatService {
    repo: ChatRepository,
    policies: Arc<PolicySet>,
}

impl ChatService {
    pub fn new(repo: ChatRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    pub async fn history(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Vec<ChatMessage>, AppError> {
        let messages = self.repo.recent(&mut *conn, HISTORY_LIMIT).await?;
        Ok(self.policies.visible(caller, messages))
    }

    pub async fn send(&self, conn: &mut PgConnection, caller: &Caller, content: &str) -> Result<ChatMessage, AppError> {
        let sender = caller.user_id();
        self.policies
            .authorize_insert(TABLE, caller, &RowFacts::owned_by(sender))
            .ensure(TABLE)?;

        let Some(sender) = sender else {
            return Err(rls_violation(TABLE));
        };
        self.repo.create(&mut *conn, sender, content.trim()).await
    }

    // Só o remetente apaga; para os outros a mensagem "não existe"
    pub async fn delete(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let message = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .filter(|message| self.policies.can_read(caller, message))
            .ok_or(AppError::NotFound)?;

        self.policies
            .authorize_delete(TABLE, caller, &message.facts())
            .ensure(TABLE)?;

        if !self.repo.delete(&mut *conn, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
