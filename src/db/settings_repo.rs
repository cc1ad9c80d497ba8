// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::settings::UserSettings};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    /// Preferências gravadas, ou os padrões quando o usuário nunca salvou nada.
    pub async fn get_settings<'e, E>(&self, executor: E, user_id: Uuid) -> Result<UserSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT user_id, timezone, currency, date_format, time_format, updated_at
            FROM user_settings WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(settings.unwrap_or_else(|| UserSettings::defaults_for(user_id)))
    }

    pub async fn save_settings<'e, E>(&self, executor: E, settings: &UserSettings) -> Result<UserSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let saved = sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (user_id, timezone, currency, date_format, time_format, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                timezone = EXCLUDED.timezone,
                currency = EXCLUDED.currency,
                date_format = EXCLUDED.date_format,
                time_format = EXCLUDED.time_format,
                updated_at = NOW()
            RETURNING user_id, timezone, currency, date_format, time_format, updated_at
            "#,
        )
        .bind(settings.user_id)
        .bind(&settings.timezone)
        .bind(settings.currency)
        .bind(&settings.date_format)
        .bind(settings.time_format)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }
}
