//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ops_crm::{
    config::{AppState, Config},
    db::{schema, PolicyRepository},
    router::build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Colunas de dono antigas precisam convergir antes das políticas
    let reconciled = schema::reconcile_ownership(&app_state.db_pool).await?;
    tracing::info!(steps = reconciled, "Reconciliação de dono concluída");

    PolicyRepository::new(app_state.db_pool.clone())
        .install(&app_state.policies)
        .await?;

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
