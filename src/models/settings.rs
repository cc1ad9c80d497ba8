// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    access::{GovernedRow, RowFacts, Table},
    common::error::AppError,
};

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_DATE_FORMAT: &str = "MM/DD/YYYY";
pub const DATE_FORMATS: [&str; 3] = ["MM/DD/YYYY", "DD/MM/YYYY", "YYYY-MM-DD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "currency_code")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "time_format")]
pub enum TimeFormat {
    #[default]
    #[sqlx(rename = "12h")]
    #[serde(rename = "12h")]
    TwelveHour,
    #[sqlx(rename = "24h")]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

// Preferências de exibição de cada usuário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[schema(ignore)] // O dono vem do token
    pub user_id: Uuid,

    #[schema(example = "America/Sao_Paulo")]
    pub timezone: String,

    pub currency: Currency,

    #[schema(example = "DD/MM/YYYY")]
    pub date_format: String,

    pub time_format: TimeFormat,

    // None enquanto o usuário nunca salvou nada
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSettings {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            timezone: DEFAULT_TIMEZONE.to_string(),
            currency: Currency::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: TimeFormat::default(),
            updated_at: None,
        }
    }

    /// Aplica só os campos enviados.
    pub fn merged(mut self, changes: UpdateSettingsRequest) -> Result<Self, AppError> {
        if let Some(timezone) = changes.timezone {
            let timezone = timezone.trim();
            if timezone.is_empty() {
                return Err(AppError::InvalidField { field: "timezone", code: "required" });
            }
            self.timezone = timezone.to_string();
        }
        if let Some(date_format) = changes.date_format {
            if !DATE_FORMATS.contains(&date_format.as_str()) {
                return Err(AppError::InvalidField { field: "dateFormat", code: "invalid_date_format" });
            }
            self.date_format = date_format;
        }
        if let Some(currency) = changes.currency {
            self.currency = currency;
        }
        if let Some(time_format) = changes.time_format {
            self.time_format = time_format;
        }
        Ok(self)
    }
}

impl GovernedRow for UserSettings {
    const TABLE: Table = Table::UserSettings;

    fn facts(&self) -> RowFacts {
        RowFacts::owned_by(Some(self.user_id))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "America/Sao_Paulo")]
    pub timezone: Option<String>,
    pub currency: Option<Currency>,
    #[schema(example = "DD/MM/YYYY")]
    pub date_format: Option<String>,
    pub time_format: Option<TimeFormat>,
}
