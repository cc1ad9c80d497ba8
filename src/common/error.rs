// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// SQLSTATE de "new row violates row-level security policy"
const RLS_VIOLATION: &str = "42501";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo com regra que o validator não cobre (ex.: prazo fora de 12/24/36)
    #[error("Campo inválido: {field} ({code})")]
    InvalidField {
        field: &'static str,
        code: &'static str,
    },

    #[error("Token inválido")]
    InvalidToken,

    // Também cobre linhas invisíveis para o chamador
    #[error("Registro não encontrado")]
    NotFound,

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let violation = match &err {
            sqlx::Error::RowNotFound => return AppError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(RLS_VIOLATION)
                    || db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || db_err.is_foreign_key_violation() =>
            {
                Some(db_err.message().to_string())
            }
            _ => None,
        };

        match violation {
            Some(message) => AppError::ConstraintViolation(message),
            None => AppError::DatabaseError(err),
        }
    }
}

/// Erro pronto para a resposta HTTP, com a mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidField { .. } => "validation_failed",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::NotFound => "not_found",
            AppError::ConstraintViolation(_) => "constraint_violation",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n.translate(&locale.0, self.message_key());

        let details = match &self {
            // Sugestão B: devolver todos os detalhes da validação
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(&e.code);
                            Value::String(code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(codes));
                }
                Some(Value::Object(details))
            }
            AppError::InvalidField { field, code } => {
                let mut details = serde_json::Map::new();
                details.insert(field.to_string(), json!([code]));
                Some(Value::Object(details))
            }
            AppError::ConstraintViolation(reason) => Some(json!({ "reason": reason })),
            // Erros internos só vão para o log
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", self);
                None
            }
            AppError::JwtError(e) => {
                tracing::debug!("Token rejeitado: {}", e);
                None
            }
            AppError::InvalidToken | AppError::NotFound => None,
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Fallback para quem não tem o Locale à mão (middleware): mensagem em inglês
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::embedded()).into_response()
    }
}
