// src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::access::{GovernedRow, RowFacts, Table};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    #[schema(example = "Proposta enviada!")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl GovernedRow for ChatMessage {
    const TABLE: Table = Table::ChatMessages;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(Some(self.sender_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[validate(length(min = 1, max = 4000, message = "required"))]
    #[schema(example = "Proposta enviada!")]
    pub content: String,
}
