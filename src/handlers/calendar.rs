// src/handlers/calendar.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        calendar::{CalendarEvent, EventPayload, EventRangeQuery},
        identity::Caller,
    },
};

// GET /api/calendar/events
#[utoipa::path(
    get,
    path = "/api/calendar/events",
    tag = "Calendar",
    params(EventRangeQuery),
    responses(
        (status = 200, description = "Eventos próprios e coletivos", body = Vec<CalendarEvent>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(range): Query<EventRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let events = app_state
        .calendar_service
        .list(&mut tx, &caller, &range)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(events)))
}

// POST /api/calendar/events
#[utoipa::path(
    post,
    path = "/api/calendar/events",
    tag = "Calendar",
    request_body = EventPayload,
    responses(
        (status = 201, description = "Evento criado em nome do chamador", body = CalendarEvent),
        (status = 400, description = "Dados inválidos (ex.: termina antes de começar)"),
        (status = 422, description = "Chamador sem identidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<EventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload
        .into_draft()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .calendar_service
        .create(&mut tx, &caller, draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(event)))
}

// PUT /api/calendar/events/{id}
#[utoipa::path(
    put,
    path = "/api/calendar/events/{id}",
    tag = "Calendar",
    params(("id" = Uuid, Path, description = "ID do evento")),
    request_body = EventPayload,
    responses(
        (status = 200, description = "Evento atualizado", body = CalendarEvent),
        (status = 404, description = "Evento não existe ou não é do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_event(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload
        .into_draft()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .calendar_service
        .update(&mut tx, &caller, id, draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(event)))
}

// DELETE /api/calendar/events/{id}
#[utoipa::path(
    delete,
    path = "/api/calendar/events/{id}",
    tag = "Calendar",
    params(("id" = Uuid, Path, description = "ID do evento")),
    responses(
        (status = 204, description = "Evento removido"),
        (status = 404, description = "Evento não existe ou não é do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_event(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .calendar_service
        .delete(&mut tx, &caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
