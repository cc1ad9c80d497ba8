// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::access::{GovernedRow, RowFacts, Table};

// Cargo na diretoria (CREATE TYPE user_role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    #[sqlx(rename = "CEO")]
    #[serde(rename = "CEO")]
    Ceo,
    #[sqlx(rename = "CGO")]
    #[serde(rename = "CGO")]
    Cgo,
    #[sqlx(rename = "CTO")]
    #[serde(rename = "CTO")]
    Cto,
}

/// Perfil de um membro da equipe. O `id` é o mesmo do provedor de identidade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,

    #[schema(example = "ceo@empresa.com")]
    pub email: String,

    #[schema(example = "Maria Lima")]
    pub full_name: Option<String>,

    pub role: Option<Role>,

    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernedRow for Profile {
    const TABLE: Table = Table::Profiles;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(Some(self.id))
    }
}

// PUT /profiles/me (cria o perfil na primeira chamada)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    // Obrigatório só quando o perfil ainda não existe e o token não traz e-mail
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ceo@empresa.com")]
    pub email: Option<String>,

    #[validate(length(max = 200, message = "too_long"))]
    #[schema(example = "Maria Lima")]
    pub full_name: Option<String>,

    pub role: Option<Role>,

    #[validate(url(message = "invalid_url"))]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_uppercase_names() {
        assert_eq!(serde_json::to_value(Role::Cgo).unwrap(), "CGO");
        assert_eq!(serde_json::from_str::<Role>("\"CTO\"").unwrap(), Role::Cto);
        assert!(serde_json::from_str::<Role>("\"cfo\"").is_err());
    }

    #[test]
    fn payload_rejects_bad_email_and_avatar() {
        let payload: ProfilePayload = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "avatarUrl": "nope"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("avatar_url"));
    }
}
