// src/models/crm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    access::{GovernedRow, RowFacts, Table},
    common::error::AppError,
    valuation::{amount_error, CommitmentLength, DealQuote, DealTerms},
};

// --- ENUMS ---

// Mapeia o CREATE TYPE pipeline_stage do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pipeline_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Lead,
    Contacted,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Frota Rápida Ltda")]
    pub company_name: String,
    #[schema(example = "Ana Souza")]
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub pipeline_stage: PipelineStage,

    // Campos do negócio. O valor é derivado (ver ClientView).
    #[schema(example = 3)]
    pub number_of_cars: i32,
    pub commitment_length: CommitmentLength,
    #[schema(example = "335.00")]
    pub per_car_value: Decimal,
    #[schema(example = "96.00")]
    pub setup_fee: Decimal,

    // Único dono do cliente
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn deal_terms(&self) -> DealTerms {
        DealTerms {
            per_car_value: self.per_car_value,
            number_of_cars: self.number_of_cars,
            setup_fee: self.setup_fee,
            commitment_length: self.commitment_length,
        }
    }
}

impl GovernedRow for Client {
    const TABLE: Table = Table::Clients;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(self.assigned_to)
    }
}

// Cliente + valor calculado do negócio
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    #[serde(flatten)]
    pub client: Client,

    #[schema(example = "13212.00")]
    pub deal_value: Decimal,
}

impl From<Client> for ClientView {
    fn from(client: Client) -> Self {
        let deal_value = DealQuote::from(client.deal_terms()).deal_value;
        Self { client, deal_value }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Frota Rápida Ltda")]
    pub company_name: String,

    #[schema(example = "Ana Souza")]
    pub contact_name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ana@frotarapida.com")]
    pub email: Option<String>,
    pub phone: Option<String>,

    pub pipeline_stage: Option<PipelineStage>,

    #[validate(range(min = 0, message = "invalid_number_of_cars"))]
    #[schema(example = 3)]
    pub number_of_cars: Option<i32>,

    // Validado na conversão para CommitmentLength
    #[schema(example = 12)]
    pub commitment_length: Option<i32>,

    #[schema(example = "335.00")]
    pub per_car_value: Option<Decimal>,
    #[schema(example = "96.00")]
    pub setup_fee: Option<Decimal>,

    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

/// Cliente validado, com os padrões aplicados, pronto para gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pipeline_stage: PipelineStage,
    pub terms: DealTerms,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

impl ClientDraft {
    pub fn facts(&self) -> RowFacts {
        RowFacts::owned_by(self.assigned_to)
    }
}

impl ClientPayload {
    pub fn into_draft(self) -> Result<ClientDraft, AppError> {
        self.validate()?;

        let terms = deal_terms_from(
            self.number_of_cars,
            self.commitment_length,
            self.per_car_value,
            self.setup_fee,
        )?;

        Ok(ClientDraft {
            company_name: self.company_name.trim().to_string(),
            contact_name: self.contact_name,
            email: self.email,
            phone: self.phone,
            pipeline_stage: self.pipeline_stage.unwrap_or_default(),
            terms,
            assigned_to: self.assigned_to,
            notes: self.notes,
        })
    }
}

// Transferência explícita de dono (substitui colunas de dono paralelas)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferClientPayload {
    // null = cliente sem dono
    pub assigned_to: Option<Uuid>,
}

// Simulação de valor sem cliente gravado
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealQuotePayload {
    #[validate(range(min = 0, message = "invalid_number_of_cars"))]
    #[schema(example = 3)]
    pub number_of_cars: Option<i32>,
    #[schema(example = 12)]
    pub commitment_length: Option<i32>,
    #[schema(example = "335.00")]
    pub per_car_value: Option<Decimal>,
    #[schema(example = "96.00")]
    pub setup_fee: Option<Decimal>,
}

impl DealQuotePayload {
    pub fn into_terms(self) -> Result<DealTerms, AppError> {
        self.validate()?;
        deal_terms_from(
            self.number_of_cars,
            self.commitment_length,
            self.per_car_value,
            self.setup_fee,
        )
    }
}

fn deal_terms_from(
    number_of_cars: Option<i32>,
    commitment_length: Option<i32>,
    per_car_value: Option<Decimal>,
    setup_fee: Option<Decimal>,
) -> Result<DealTerms, AppError> {
    let defaults = DealTerms::default();

    let commitment_length = match commitment_length {
        Some(months) => CommitmentLength::try_from(months).map_err(|_| AppError::InvalidField {
            field: "commitmentLength",
            code: "invalid_commitment_length",
        })?,
        None => defaults.commitment_length,
    };

    let per_car_value = per_car_value.unwrap_or(defaults.per_car_value);
    if let Some(code) = amount_error(per_car_value) {
        return Err(AppError::InvalidField { field: "perCarValue", code });
    }

    let setup_fee = setup_fee.unwrap_or(defaults.setup_fee);
    if let Some(code) = amount_error(setup_fee) {
        return Err(AppError::InvalidField { field: "setupFee", code });
    }

    let terms = DealTerms {
        per_car_value,
        number_of_cars: number_of_cars.unwrap_or(defaults.number_of_cars),
        setup_fee,
        commitment_length,
    };
    if terms.checked_deal_value().is_none() {
        return Err(AppError::InvalidField { field: "numberOfCars", code: "out_of_range" });
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload(json: serde_json::Value) -> ClientPayload {
        serde_json::from_value(json).expect("payload")
    }

    #[test]
    fn draft_applies_pricing_defaults() {
        let draft = payload(serde_json::json!({ "companyName": "  Frota  ", "numberOfCars": 3 }))
            .into_draft()
            .expect("draft");

        assert_eq!(draft.company_name, "Frota");
        assert_eq!(draft.pipeline_stage, PipelineStage::Lead);
        assert_eq!(draft.terms.deal_value(), Decimal::from(13212));
    }

    #[test]
    fn draft_rejects_unknown_commitment_length() {
        let err = payload(serde_json::json!({ "companyName": "Frota", "commitmentLength": 18 }))
            .into_draft()
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidField { field: "commitmentLength", code: "invalid_commitment_length" }
        ));
    }

    #[test]
    fn draft_rejects_negative_cars_and_empty_name() {
        let err = payload(serde_json::json!({ "companyName": "", "numberOfCars": -1 }))
            .into_draft()
            .unwrap_err();

        match err {
            AppError::ValidationError(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("company_name"));
                assert!(fields.contains_key("number_of_cars"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn quote_payload_rejects_negative_fee() {
        let quote = DealQuotePayload {
            setup_fee: Some(Decimal::from_str("-1").unwrap()),
            ..DealQuotePayload::default()
        };
        assert!(matches!(
            quote.into_terms(),
            Err(AppError::InvalidField { field: "setupFee", .. })
        ));
    }

    #[test]
    fn quote_payload_rejects_amounts_beyond_money_columns() {
        let quote: DealQuotePayload = serde_json::from_value(serde_json::json!({
            "numberOfCars": 2147483647,
            "commitmentLength": 36,
            "perCarValue": "79228162514264337593543950335",
            "setupFee": 0
        }))
        .expect("payload");

        assert!(matches!(
            quote.into_terms(),
            Err(AppError::InvalidField { field: "perCarValue", code: "out_of_range" })
        ));
    }

    #[test]
    fn largest_fleet_at_maximum_price_is_quoted() {
        let quote = DealQuotePayload {
            number_of_cars: Some(i32::MAX),
            commitment_length: Some(36),
            per_car_value: Some(Decimal::from_str("9999999999.99").unwrap()),
            setup_fee: Some(Decimal::from_str("9999999999.99").unwrap()),
        };
        let terms = quote.into_terms().expect("termos");
        assert!(terms.deal_value() > Decimal::ZERO);
    }

    #[test]
    fn view_serializes_flat_with_deal_value() {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            company_name: "Frota".into(),
            contact_name: None,
            email: None,
            phone: None,
            pipeline_stage: PipelineStage::Proposal,
            number_of_cars: 3,
            commitment_length: CommitmentLength::default(),
            per_car_value: Decimal::from(335),
            setup_fee: Decimal::from(96),
            assigned_to: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(ClientView::from(client)).unwrap();
        assert_eq!(json["companyName"], "Frota");
        assert_eq!(json["pipelineStage"], "proposal");
        assert_eq!(json["commitmentLength"], 12);
        assert_eq!(json["dealValue"].as_f64(), Some(13212.0));
    }
}
