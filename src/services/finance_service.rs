// src/services/finance_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{PolicySet, RowFacts, Table, Verb},
    common::error::AppError,
    db::{ClientRepository, FinanceRepository},
    models::{
        finance::{Expense, ExpensePayload, Payment, PaymentPayload},
        identity::Caller,
    },
    valuation::{DateRange, ProfitabilitySummary},
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    clients: ClientRepository,
    policies: Arc<PolicySet>,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, clients: ClientRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, clients, policies }
    }

    // =========================================================================
    //  LANÇAMENTOS
    // =========================================================================

    pub async fn list_payments(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        client_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        self.ensure_client_visible(conn, caller, client_id).await?;
        let payments = self.repo.list_payments(&mut *conn, client_id).await?;
        Ok(self.policies.visible(caller, payments))
    }

    pub async fn record_payment(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        client_id: Uuid,
        payload: &PaymentPayload,
    ) -> Result<Payment, AppError> {
        self.ensure_client_visible(conn, caller, client_id).await?;
        self.policies
            .authorize_insert(Table::Payments, caller, &RowFacts::default())
            .ensure(Table::Payments)?;

        let payment = self.repo.create_payment(&mut *conn, client_id, payload).await?;
        tracing::info!(%client_id, payment_id = %payment.id, status = ?payment.status, "Pagamento registrado");
        Ok(payment)
    }

    pub async fn list_expenses(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        client_id: Uuid,
    ) -> Result<Vec<Expense>, AppError> {
        self.ensure_client_visible(conn, caller, client_id).await?;
        let expenses = self.repo.list_expenses(&mut *conn, client_id).await?;
        Ok(self.policies.visible(caller, expenses))
    }

    pub async fn record_expense(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        client_id: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Expense, AppError> {
        self.ensure_client_visible(conn, caller, client_id).await?;
        self.policies
            .authorize_insert(Table::Expenses, caller, &RowFacts::default())
            .ensure(Table::Expenses)?;

        let expense = self.repo.create_expense(&mut *conn, client_id, payload).await?;
        tracing::info!(%client_id, expense_id = %expense.id, status = ?expense.status, "Despesa registrada");
        Ok(expense)
    }

    // =========================================================================
    //  RENTABILIDADE
    // =========================================================================

    /// Receita = pagamentos concluídos, custo = despesas aprovadas, ambos dentro do intervalo.
    /// Intervalo invertido nem chega aqui: o handler devolve o resumo zerado.
    pub async fn profitability(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        client_id: Uuid,
        range: DateRange,
    ) -> Result<ProfitabilitySummary, AppError> {
        self.ensure_client_visible(conn, caller, client_id).await?;

        // Sem permissão de leitura nos livros = livros vazios
        let revenue = if self.ledger_readable(Table::Payments, caller) {
            self.repo.completed_payment_totals(&mut *conn, client_id, range).await?
        } else {
            Default::default()
        };
        let expenses = if self.ledger_readable(Table::Expenses, caller) {
            self.repo.approved_expense_totals(&mut *conn, client_id, range).await?
        } else {
            Default::default()
        };

        Ok(ProfitabilitySummary::from_totals(client_id, range, &revenue, &expenses))
    }

    // Lançamentos não têm dono: a leitura depende só da tabela
    fn ledger_readable(&self, table: Table, caller: &Caller) -> bool {
        self.policies
            .permits(table, Verb::Select, caller, Some(&RowFacts::default()), None)
    }

    async fn ensure_client_visible(&self, conn: &mut PgConnection, caller: &Caller, client_id: Uuid) -> Result<(), AppError> {
        let visible = self
            .clients
            .find_by_id(&mut *conn, client_id)
            .await?
            .is_some_and(|client| self.policies.can_read(caller, &client));

        if visible { Ok(()) } else { Err(AppError::NotFound) }
    }
}
