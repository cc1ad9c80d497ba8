// src/models/calendar.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    access::{GovernedRow, RowFacts, Table},
    common::error::AppError,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,

    // Dono do evento
    pub user_id: Uuid,

    #[schema(example = "Reunião com a Frota Rápida")]
    pub title: String,
    pub description: Option<String>,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    // false = só o dono vê; true = toda a equipe vê
    pub is_collective: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernedRow for CalendarEvent {
    const TABLE: Table = Table::CalendarEvents;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(Some(self.user_id)).with_shared(self.is_collective)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Reunião com a Frota Rápida")]
    pub title: String,

    pub description: Option<String>,

    #[schema(example = "2024-05-10T14:00:00Z")]
    pub start_time: DateTime<Utc>,
    #[schema(example = "2024-05-10T15:00:00Z")]
    pub end_time: DateTime<Utc>,

    #[serde(default)]
    pub is_collective: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_collective: bool,
}

impl EventPayload {
    pub fn into_draft(self) -> Result<EventDraft, AppError> {
        self.validate()?;

        if self.end_time < self.start_time {
            return Err(AppError::InvalidField { field: "endTime", code: "ends_before_start" });
        }

        Ok(EventDraft {
            title: self.title.trim().to_string(),
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            is_collective: self.is_collective,
        })
    }
}

impl EventDraft {
    /// Fatos da linha que será gravada em nome de `owner`.
    pub fn facts_for(&self, owner: Option<Uuid>) -> RowFacts {
        RowFacts::owned_by(owner).with_shared(self.is_collective)
    }
}

// Filtro opcional por janela de tempo (eventos que se sobrepõem a [from, to])
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(start: &str, end: &str) -> EventPayload {
        serde_json::from_value(serde_json::json!({
            "title": "Demo",
            "startTime": start,
            "endTime": end,
        }))
        .unwrap()
    }

    #[test]
    fn event_must_not_end_before_it_starts() {
        let err = payload("2024-05-10T15:00:00Z", "2024-05-10T14:00:00Z")
            .into_draft()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "endTime", .. }));
    }

    #[test]
    fn zero_length_event_is_accepted_and_personal_by_default() {
        let draft = payload("2024-05-10T15:00:00Z", "2024-05-10T15:00:00Z")
            .into_draft()
            .unwrap();
        assert!(!draft.is_collective);
        assert!(!draft.facts_for(None).shared);
    }
}
