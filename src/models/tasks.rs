// src/models/tasks.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::access::{GovernedRow, RowFacts, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

// --- GRUPOS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: Uuid,
    #[schema(example = "Onboarding")]
    pub name: String,
    #[schema(example = "#3b82f6")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GovernedRow for TaskGroup {
    const TABLE: Table = Table::TaskGroups;

    fn facts(&self) -> RowFacts {
        RowFacts::default()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroupPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Onboarding")]
    pub name: String,

    #[validate(length(equal = 7, message = "invalid_color"))]
    #[schema(example = "#3b82f6")]
    pub color: Option<String>,
}

// --- TAREFAS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub group_id: Option<Uuid>,

    #[schema(example = "Enviar proposta")]
    pub title: String,
    pub description: Option<String>,

    pub status: TaskStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub due_date: Option<NaiveDate>,

    // Responsável (informativo: tarefas são da equipe)
    pub assigned_to: Option<Uuid>,
    pub is_shared: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernedRow for Task {
    const TABLE: Table = Table::Tasks;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(self.assigned_to)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub group_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Enviar proposta")]
    pub title: String,
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub due_date: Option<NaiveDate>,

    pub assigned_to: Option<Uuid>,

    // Só exibição; a visibilidade da tarefa não depende dele
    #[serde(default = "shared_by_default")]
    pub is_shared: bool,
}

fn shared_by_default() -> bool {
    true
}

impl TaskPayload {
    pub fn facts(&self) -> RowFacts {
        RowFacts::owned_by(self.assigned_to)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    pub group_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_payload_defaults() {
        let payload: TaskPayload = serde_json::from_value(serde_json::json!({ "title": "Ligar" })).unwrap();
        assert_eq!(payload.status, TaskStatus::Todo);
        assert!(payload.is_shared);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn shared_toggle_does_not_reach_policies() {
        let owner = Uuid::new_v4();
        let private: TaskPayload = serde_json::from_value(serde_json::json!({
            "title": "Ligar",
            "assignedTo": owner,
            "isShared": false,
        }))
        .unwrap();
        let shared: TaskPayload = serde_json::from_value(serde_json::json!({
            "title": "Ligar",
            "assignedTo": owner,
            "isShared": true,
        }))
        .unwrap();

        assert_eq!(private.facts(), shared.facts());
        assert_eq!(Table::Tasks.shared_flag_column(), None);
    }

    #[test]
    fn status_uses_snake_case() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in_progress");
    }

    #[test]
    fn group_color_must_be_a_hex_triplet_length() {
        let payload = TaskGroupPayload { name: "Vendas".into(), color: Some("blue".into()) };
        assert!(payload.validate().is_err());
    }
}
