// src/db/policy_repo.rs

use sqlx::PgPool;

use crate::access::{sql::describe, PolicySet};

#[derive(Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// (Re)instala o catálogo numa única transação: liga e força o RLS,
    /// remove todas as políticas existentes das tabelas e cria as do catálogo.
    pub async fn install(&self, catalog: &PolicySet) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for policy in catalog.policies() {
            tracing::debug!("Política: {}", describe(policy));
        }

        for statement in catalog.install_statements() {
            sqlx::raw_sql(&statement).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            politicas = catalog.policies().len(),
            tabelas = catalog.managed_tables().len(),
            "✅ Políticas de RLS instaladas"
        );
        Ok(())
    }
}
