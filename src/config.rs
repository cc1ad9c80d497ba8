// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    access::{default_catalog, PolicySet},
    common::i18n::I18nStore,
    db::{
        CalendarRepository, ChatRepository, ClientRepository, FinanceRepository, JournalRepository,
        ProfileRepository, SettingsRepository, TaskRepository,
    },
    services::{
        calendar_service::CalendarService, chat_service::ChatService, client_service::ClientService,
        finance_service::FinanceService, identity::IdentityVerifier, journal_service::JournalService,
        profile_service::ProfileService, settings_service::SettingsService, task_service::TaskService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS deve ser um número")?
            .unwrap_or(5);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("DATABASE_ACQUIRE_TIMEOUT_SECS deve ser um número")?
            .unwrap_or(3);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub identity: IdentityVerifier,
    pub policies: Arc<PolicySet>,
    pub i18n_store: Arc<I18nStore>,

    pub profile_service: ProfileService,
    pub settings_service: SettingsService,
    pub client_service: ClientService,
    pub finance_service: FinanceService,
    pub calendar_service: CalendarService,
    pub task_service: TaskService,
    pub journal_service: JournalService,
    pub chat_service: ChatService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    /// Monta o gráfico de dependências sobre uma pool já criada.
    pub fn with_pool(config: &Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let policies = Arc::new(default_catalog());
        let i18n_store = Arc::new(I18nStore::load_embedded()?);

        let client_repo = ClientRepository::new();

        Ok(Self {
            identity: IdentityVerifier::new(&config.jwt_secret, &config.jwt_audience),
            profile_service: ProfileService::new(ProfileRepository::new(), policies.clone()),
            settings_service: SettingsService::new(SettingsRepository::new(), policies.clone()),
            client_service: ClientService::new(client_repo.clone(), policies.clone()),
            finance_service: FinanceService::new(FinanceRepository::new(), client_repo, policies.clone()),
            calendar_service: CalendarService::new(CalendarRepository::new(), policies.clone()),
            task_service: TaskService::new(TaskRepository::new(), policies.clone()),
            journal_service: JournalService::new(JournalRepository::new(), policies.clone()),
            chat_service: ChatService::new(ChatRepository::new(), policies.clone()),
            policies,
            i18n_store,
            db_pool,
        })
    }
}
