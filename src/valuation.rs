// src/valuation.rs

//! Valor do negócio e rentabilidade por cliente.
//!
//! Funções puras: os repositórios trazem os totais do banco e tudo o que é
//! derivado (lucro, margem, médias, arredondamento) é calculado aqui.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_PER_CAR_VALUE: Decimal = Decimal::from_parts(33500, 0, 0, false, 2); // 335.00
pub const DEFAULT_SETUP_FEE: Decimal = Decimal::from_parts(9600, 0, 0, false, 2); // 96.00
pub const ALLOWED_COMMITMENT_LENGTHS: [i32; 3] = [12, 24, 36];
/// Maior valor que cabe em NUMERIC(12, 2).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2); // 9999999999.99

/// Código de erro para um valor monetário fora da faixa das colunas de dinheiro.
pub fn amount_error(value: Decimal) -> Option<&'static str> {
    if value.is_sign_negative() {
        Some("negative_amount")
    } else if value > MAX_AMOUNT {
        Some("out_of_range")
    } else {
        None
    }
}

// =========================================================================
//  PRAZO DE COMPROMISSO
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("commitment_length deve ser 12, 24 ou 36 (recebido {0})")]
pub struct InvalidCommitmentLength(pub i32);

/// Prazo do contrato em meses. Só existe com 12, 24 ou 36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(transparent)]
#[serde(try_from = "i32", into = "i32")]
#[schema(value_type = i32, example = 12)]
pub struct CommitmentLength(i32);

impl CommitmentLength {
    pub fn months(self) -> i32 {
        self.0
    }
}

impl Default for CommitmentLength {
    fn default() -> Self {
        CommitmentLength(12)
    }
}

impl TryFrom<i32> for CommitmentLength {
    type Error = InvalidCommitmentLength;

    fn try_from(months: i32) -> Result<Self, Self::Error> {
        if ALLOWED_COMMITMENT_LENGTHS.contains(&months) {
            Ok(CommitmentLength(months))
        } else {
            Err(InvalidCommitmentLength(months))
        }
    }
}

impl From<CommitmentLength> for i32 {
    fn from(value: CommitmentLength) -> Self {
        value.0
    }
}

// =========================================================================
//  VALOR DO NEGÓCIO
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealTerms {
    #[schema(example = "335.00")]
    pub per_car_value: Decimal,
    #[schema(example = 3)]
    pub number_of_cars: i32,
    #[schema(example = "96.00")]
    pub setup_fee: Decimal,
    pub commitment_length: CommitmentLength,
}

impl Default for DealTerms {
    fn default() -> Self {
        Self {
            per_car_value: DEFAULT_PER_CAR_VALUE,
            number_of_cars: 0,
            setup_fee: DEFAULT_SETUP_FEE,
            commitment_length: CommitmentLength::default(),
        }
    }
}

impl DealTerms {
    /// `(per_car_value * number_of_cars + setup_fee) * commitment_length`
    pub fn deal_value(&self) -> Decimal {
        // Termos validados (ou lidos do banco) nunca estouram; o teto só evita pânico
        self.checked_deal_value().unwrap_or(Decimal::MAX)
    }

    /// `None` se o cálculo estourar a faixa do `Decimal`.
    pub fn checked_deal_value(&self) -> Option<Decimal> {
        self.per_car_value
            .checked_mul(Decimal::from(self.number_of_cars))?
            .checked_add(self.setup_fee)?
            .checked_mul(Decimal::from(self.commitment_length.months()))
    }
}

// Resposta de /deal-value e /quote
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealQuote {
    #[serde(flatten)]
    pub terms: DealTerms,
    #[schema(example = "13212.00")]
    pub deal_value: Decimal,
}

impl From<DealTerms> for DealQuote {
    fn from(terms: DealTerms) -> Self {
        Self { deal_value: money(terms.deal_value()), terms }
    }
}

// =========================================================================
//  RENTABILIDADE
// =========================================================================

/// Intervalo fechado de datas com início <= fim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// `None` quando o intervalo está invertido.
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

// Totais agregados de um livro (pagamentos ou despesas) no intervalo
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct LedgerTotals {
    pub total: Decimal,
    pub count: i64,
    pub last_date: Option<NaiveDate>,
}

impl LedgerTotals {
    fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(self.count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilitySummary {
    pub client_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-12-31")]
    pub end_date: NaiveDate,

    #[schema(example = "300.00")]
    pub total_revenue: Decimal,
    #[schema(example = "50.00")]
    pub total_expenses: Decimal,
    #[schema(example = "250.00")]
    pub net_profit: Decimal,
    #[schema(example = "83.33")]
    pub profit_margin: Decimal,

    pub payment_count: i64,
    pub expense_count: i64,
    #[schema(example = "150.00")]
    pub average_payment: Decimal,
    #[schema(example = "50.00")]
    pub average_expense: Decimal,

    #[schema(value_type = Option<String>, format = Date)]
    pub last_payment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub last_expense_date: Option<NaiveDate>,
}

impl ProfitabilitySummary {
    /// Resumo zerado (intervalo invertido ou nenhum lançamento).
    pub fn empty(client_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            client_id,
            start_date,
            end_date,
            total_revenue: money(Decimal::ZERO),
            total_expenses: money(Decimal::ZERO),
            net_profit: money(Decimal::ZERO),
            profit_margin: money(Decimal::ZERO),
            payment_count: 0,
            expense_count: 0,
            average_payment: money(Decimal::ZERO),
            average_expense: money(Decimal::ZERO),
            last_payment_date: None,
            last_expense_date: None,
        }
    }

    /// `revenue` são os pagamentos concluídos, `expenses` as despesas aprovadas.
    pub fn from_totals(
        client_id: Uuid,
        range: DateRange,
        revenue: &LedgerTotals,
        expenses: &LedgerTotals,
    ) -> Self {
        let net_profit = revenue.total - expenses.total;

        // Margem 0 quando não há receita (nada de divisão por zero)
        let profit_margin = if revenue.total.is_zero() {
            Decimal::ZERO
        } else {
            net_profit * Decimal::ONE_HUNDRED / revenue.total
        };

        Self {
            client_id,
            start_date: range.start(),
            end_date: range.end(),
            total_revenue: money(revenue.total),
            total_expenses: money(expenses.total),
            net_profit: money(net_profit),
            profit_margin: money(profit_margin),
            payment_count: revenue.count,
            expense_count: expenses.count,
            average_payment: money(revenue.average()),
            average_expense: money(expenses.average()),
            last_payment_date: revenue.last_date,
            last_expense_date: expenses.last_date,
        }
    }
}

/// Duas casas decimais, meio para longe do zero (igual ao ROUND do Postgres).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// Arredonda e fixa a escala em 2 (0 vira 0.00)
fn money(value: Decimal) -> Decimal {
    let mut rounded = round2(value);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger(amounts: &[&str], last: Option<&str>) -> LedgerTotals {
        LedgerTotals {
            total: amounts.iter().map(|a| dec(a)).sum(),
            count: amounts.len() as i64,
            last_date: last.map(date),
        }
    }

    #[test]
    fn defaults_match_pricing_sheet() {
        let terms = DealTerms::default();
        assert_eq!(terms.per_car_value, dec("335.00"));
        assert_eq!(terms.setup_fee, dec("96.00"));
        assert_eq!(terms.commitment_length.months(), 12);
        assert_eq!(terms.number_of_cars, 0);
    }

    #[test]
    fn deal_value_for_three_cars_over_twelve_months() {
        let terms = DealTerms {
            number_of_cars: 3,
            ..DealTerms::default()
        };
        assert_eq!(terms.deal_value(), dec("13212"));
    }

    #[test]
    fn deal_value_scales_with_commitment() {
        let terms = DealTerms {
            number_of_cars: 10,
            per_car_value: dec("300"),
            setup_fee: dec("0"),
            commitment_length: CommitmentLength::try_from(36).unwrap(),
        };
        assert_eq!(terms.deal_value(), dec("108000"));
    }

    #[test]
    fn huge_terms_do_not_panic() {
        let terms = DealTerms {
            number_of_cars: i32::MAX,
            per_car_value: Decimal::MAX,
            setup_fee: Decimal::ZERO,
            commitment_length: CommitmentLength::try_from(36).unwrap(),
        };
        assert_eq!(terms.checked_deal_value(), None);
        assert_eq!(terms.deal_value(), Decimal::MAX);
    }

    #[test]
    fn largest_storable_terms_still_fit() {
        let terms = DealTerms {
            number_of_cars: i32::MAX,
            per_car_value: MAX_AMOUNT,
            setup_fee: MAX_AMOUNT,
            commitment_length: CommitmentLength::try_from(36).unwrap(),
        };
        assert!(terms.checked_deal_value().is_some());
    }

    #[test]
    fn amount_range_matches_money_columns() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
        assert_eq!(amount_error(dec("0")), None);
        assert_eq!(amount_error(MAX_AMOUNT), None);
        assert_eq!(amount_error(dec("-0.01")), Some("negative_amount"));
        assert_eq!(amount_error(dec("10000000000")), Some("out_of_range"));
    }

    #[test]
    fn commitment_length_only_accepts_known_terms() {
        for months in ALLOWED_COMMITMENT_LENGTHS {
            assert_eq!(CommitmentLength::try_from(months).unwrap().months(), months);
        }
        for months in [0, 1, 6, 11, 13, 18, 48, -12] {
            assert_eq!(CommitmentLength::try_from(months), Err(InvalidCommitmentLength(months)));
        }
    }

    #[test]
    fn commitment_length_rejected_on_deserialize() {
        assert!(serde_json::from_str::<CommitmentLength>("24").is_ok());
        assert!(serde_json::from_str::<CommitmentLength>("18").is_err());
    }

    #[test]
    fn quote_carries_rounded_value() {
        let quote = DealQuote::from(DealTerms {
            number_of_cars: 3,
            ..DealTerms::default()
        });
        assert_eq!(quote.deal_value, dec("13212.00"));
        assert_eq!(quote.deal_value.scale(), 2);
    }

    #[test]
    fn margin_for_mixed_ledger() {
        let range = DateRange::try_new(date("2024-01-01"), date("2024-12-31")).unwrap();
        let summary = ProfitabilitySummary::from_totals(
            Uuid::nil(),
            range,
            &ledger(&["100", "200"], Some("2024-03-10")),
            &ledger(&["50"], Some("2024-02-01")),
        );

        assert_eq!(summary.total_revenue, dec("300.00"));
        assert_eq!(summary.total_expenses, dec("50.00"));
        assert_eq!(summary.net_profit, dec("250.00"));
        assert_eq!(summary.profit_margin, dec("83.33"));
        assert_eq!(summary.payment_count, 2);
        assert_eq!(summary.expense_count, 1);
        assert_eq!(summary.average_payment, dec("150.00"));
        assert_eq!(summary.average_expense, dec("50.00"));
        assert_eq!(summary.last_payment_date, Some(date("2024-03-10")));
        assert_eq!(summary.last_expense_date, Some(date("2024-02-01")));
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        let range = DateRange::try_new(date("2024-01-01"), date("2024-01-31")).unwrap();
        let summary = ProfitabilitySummary::from_totals(
            Uuid::nil(),
            range,
            &LedgerTotals::default(),
            &ledger(&["40"], None),
        );

        assert_eq!(summary.profit_margin, dec("0.00"));
        assert_eq!(summary.net_profit, dec("-40.00"));
        assert_eq!(summary.average_payment, Decimal::ZERO);
    }

    #[test]
    fn averages_round_half_away_from_zero() {
        let range = DateRange::try_new(date("2024-01-01"), date("2024-01-31")).unwrap();
        // 0.01 + 0.02 = 0.03 / 2 = 0.015 -> 0.02
        let summary = ProfitabilitySummary::from_totals(
            Uuid::nil(),
            range,
            &ledger(&["0.01", "0.02"], None),
            &LedgerTotals::default(),
        );
        assert_eq!(summary.average_payment, dec("0.02"));
    }

    #[test]
    fn inverted_range_is_rejected_and_empty_summary_is_zeroed() {
        assert!(DateRange::try_new(date("2024-02-01"), date("2024-01-01")).is_none());
        assert!(DateRange::try_new(date("2024-01-01"), date("2024-01-01")).is_some());

        let empty = ProfitabilitySummary::empty(Uuid::nil(), date("2024-02-01"), date("2024-01-01"));
        assert_eq!(empty.total_revenue, dec("0.00"));
        assert_eq!(empty.total_revenue.scale(), 2);
        assert_eq!(empty.profit_margin, Decimal::ZERO);
        assert_eq!(empty.payment_count, 0);
        assert_eq!(empty.last_payment_date, None);
    }
}
