// src/handlers/finance.rs

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
        finance::{Expense, ExpensePayload, Payment, PaymentPayload, ProfitabilityQuery},
        identity::Caller,
    },
    valuation::{DateRange, ProfitabilitySummary},
};

// GET /api/clients/{id}/profitability
#[utoipa::path(
    get,
    path = "/api/clients/{id}/profitability",
    tag = "Deal Valuation",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ProfitabilityQuery
    ),
    responses(
        (status = 200, description = "Resumo de rentabilidade (zerado se o intervalo estiver invertido)", body = ProfitabilitySummary),
        (status = 404, description = "Cliente não existe ou não é visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profitability(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(client_id): Path<Uuid>,
    Query(query): Query<ProfitabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Intervalo invertido: resumo zerado, sem consulta
    let Some(range) = DateRange::try_new(query.start_date, query.end_date) else {
        let empty = ProfitabilitySummary::empty(client_id, query.start_date, query.end_date);
        return Ok((StatusCode::OK, Json(empty)));
    };

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .finance_service
        .profitability(&mut tx, &caller, client_id, range)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/clients/{id}/payments
#[utoipa::path(
    get,
    path = "/api/clients/{id}/payments",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Pagamentos do cliente", body = Vec<Payment>),
        (status = 404, description = "Cliente não existe ou não é visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let payments = app_state
        .finance_service
        .list_payments(&mut tx, &caller, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}

// POST /api/clients/{id}/payments
#[utoipa::path(
    post,
    path = "/api/clients/{id}/payments",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = PaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não existe ou não é visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .finance_service
        .record_payment(&mut tx, &caller, client_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// GET /api/clients/{id}/expenses
#[utoipa::path(
    get,
    path = "/api/clients/{id}/expenses",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Despesas do cliente", body = Vec<Expense>),
        (status = 404, description = "Cliente não existe ou não é visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expenses = app_state
        .finance_service
        .list_expenses(&mut tx, &caller, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expenses)))
}

// POST /api/clients/{id}/expenses
#[utoipa::path(
    post,
    path = "/api/clients/{id}/expenses",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada", body = Expense),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não existe ou não é visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .finance_service
        .record_expense(&mut tx, &caller, client_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}
