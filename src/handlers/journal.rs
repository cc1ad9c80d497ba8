// src/handlers/journal.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        identity::Caller,
        journal::{JournalEntry, JournalPayload},
    },
};

// GET /api/journal
#[utoipa::path(
    get,
    path = "/api/journal",
    tag = "Journal",
    responses((status = 200, description = "Entradas do próprio chamador", body = Vec<JournalEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = app_state
        .journal_service
        .list(&mut tx, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/journal
#[utoipa::path(
    post,
    path = "/api/journal",
    tag = "Journal",
    request_body = JournalPayload,
    responses(
        (status = 201, description = "Entrada criada", body = JournalEntry),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Chamador sem identidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<JournalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .journal_service
        .create(&mut tx, &caller, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// PUT /api/journal/{id}
#[utoipa::path(
    put,
    path = "/api/journal/{id}",
    tag = "Journal",
    params(("id" = Uuid, Path, description = "ID da entrada")),
    request_body = JournalPayload,
    responses(
        (status = 200, description = "Entrada atualizada", body = JournalEntry),
        (status = 404, description = "Entrada não existe ou não é do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<JournalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .journal_service
        .update(&mut tx, &caller, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

// DELETE /api/journal/{id}
#[utoipa::path(
    delete,
    path = "/api/journal/{id}",
    tag = "Journal",
    params(("id" = Uuid, Path, description = "ID da entrada")),
    responses(
        (status = 204, description = "Entrada removida"),
        (status = 404, description = "Entrada não existe ou não é do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .journal_service
        .delete(&mut tx, &caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
