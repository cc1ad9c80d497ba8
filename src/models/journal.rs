// src/models/journal.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::access::{GovernedRow, RowFacts, Table};

// Diário: estritamente pessoal
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Retrospectiva da semana")]
    pub title: String,
    pub content: String,
    #[schema(value_type = String, format = Date, example = "2024-05-10")]
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernedRow for JournalEntry {
    const TABLE: Table = Table::JournalEntries;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(Some(self.user_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Retrospectiva da semana")]
    pub title: String,

    #[serde(default)]
    pub content: String,

    // Sem data = hoje (padrão do banco)
    #[schema(value_type = Option<String>, format = Date, example = "2024-05-10")]
    pub entry_date: Option<NaiveDate>,
}
