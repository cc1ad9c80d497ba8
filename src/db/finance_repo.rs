// src/db/finance_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Expense, ExpensePayload, ExpenseStatus, Payment, PaymentPayload, PaymentStatus},
    valuation::{DateRange, LedgerTotals},
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PAGAMENTOS (RECEITA)
    // =========================================================================

    pub async fn list_payments<'e, E>(&self, executor: E, client_id: Uuid) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, client_id, amount, status, payment_date, created_at
            FROM payments
            WHERE client_id = $1
            ORDER BY payment_date DESC, created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &PaymentPayload,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (client_id, amount, status, payment_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, amount, status, payment_date, created_at
            "#,
        )
        .bind(client_id)
        .bind(payload.amount)
        .bind(payload.status)
        .bind(payload.payment_date)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    /// Soma, contagem e última data dos pagamentos concluídos no intervalo.
    pub async fn completed_payment_totals<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        range: DateRange,
    ) -> Result<LedgerTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, LedgerTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0) AS total,
                COUNT(*) AS count,
                MAX(payment_date) AS last_date
            FROM payments
            WHERE client_id = $1
              AND status = $2
              AND payment_date BETWEEN $3 AND $4
            "#,
        )
        .bind(client_id)
        .bind(PaymentStatus::Completed)
        .bind(range.start())
        .bind(range.end())
        .fetch_one(executor)
        .await?;
        Ok(totals)
    }

    // =========================================================================
    //  DESPESAS (CUSTO)
    // =========================================================================

    pub async fn list_expenses<'e, E>(&self, executor: E, client_id: Uuid) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, client_id, amount, category, status, expense_date, created_at
            FROM expenses
            WHERE client_id = $1
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (client_id, amount, category, status, expense_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, amount, category, status, expense_date, created_at
            "#,
        )
        .bind(client_id)
        .bind(payload.amount)
        .bind(&payload.category)
        .bind(payload.status)
        .bind(payload.expense_date)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    /// Soma, contagem e última data das despesas aprovadas no intervalo.
    pub async fn approved_expense_totals<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        range: DateRange,
    ) -> Result<LedgerTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, LedgerTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0) AS total,
                COUNT(*) AS count,
                MAX(expense_date) AS last_date
            FROM expenses
            WHERE client_id = $1
              AND status = $2
              AND expense_date BETWEEN $3 AND $4
            "#,
        )
        .bind(client_id)
        .bind(ExpenseStatus::Approved)
        .bind(range.start())
        .bind(range.end())
        .fetch_one(executor)
        .await?;
        Ok(totals)
    }
}
