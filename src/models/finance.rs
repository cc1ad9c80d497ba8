// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    access::{GovernedRow, RowFacts, Table},
    common::error::AppError,
    valuation::amount_error,
};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed, // Só estes contam como receita
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved, // Só estas contam como custo
    Rejected,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "1101.00")]
    pub amount: Decimal,
    pub status: PaymentStatus,

    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl GovernedRow for Payment {
    const TABLE: Table = Table::Payments;

    fn facts(&self) -> RowFacts {
        RowFacts::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "50.00")]
    pub amount: Decimal,
    #[schema(example = "rastreadores")]
    pub category: Option<String>,
    pub status: ExpenseStatus,

    #[schema(value_type = String, format = Date, example = "2024-02-01")]
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl GovernedRow for Expense {
    const TABLE: Table = Table::Expenses;

    fn facts(&self) -> RowFacts {
        RowFacts::default()
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[schema(example = "1101.00")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: PaymentStatus,
    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub payment_date: NaiveDate,
}

impl PaymentPayload {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        amount_in_range(self.amount)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[schema(example = "50.00")]
    pub amount: Decimal,
    #[validate(length(max = 100, message = "too_long"))]
    #[schema(example = "rastreadores")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[schema(value_type = String, format = Date, example = "2024-02-01")]
    pub expense_date: NaiveDate,
}

impl ExpensePayload {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        amount_in_range(self.amount)
    }
}

fn amount_in_range(amount: Decimal) -> Result<(), AppError> {
    match amount_error(amount) {
        Some(code) => Err(AppError::InvalidField { field: "amount", code }),
        None => Ok(()),
    }
}

// GET /clients/{id}/profitability?startDate=...&endDate=...
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfitabilityQuery {
    #[param(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[param(value_type = String, format = Date, example = "2024-12-31")]
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_defaults_to_pending() {
        let payload: PaymentPayload = serde_json::from_value(serde_json::json!({
            "amount": 100.0,
            "paymentDate": "2024-03-10"
        }))
        .unwrap();
        assert_eq!(payload.status, PaymentStatus::Pending);
        assert!(payload.check().is_ok());
    }

    #[test]
    fn negative_expense_is_rejected() {
        let payload: ExpensePayload = serde_json::from_value(serde_json::json!({
            "amount": -5.0,
            "status": "approved",
            "expenseDate": "2024-02-01"
        }))
        .unwrap();
        assert!(matches!(payload.check(), Err(AppError::InvalidField { field: "amount", .. })));
    }

    #[test]
    fn payment_beyond_money_column_is_rejected() {
        let payload: PaymentPayload = serde_json::from_value(serde_json::json!({
            "amount": "10000000000.00",
            "paymentDate": "2024-03-10"
        }))
        .unwrap();
        assert!(matches!(
            payload.check(),
            Err(AppError::InvalidField { field: "amount", code: "out_of_range" })
        ));
    }
}
