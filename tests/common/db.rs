// tests/common/db.rs

//! Banco real para os testes de políticas e reconciliação.
//!
//! Só roda com `DATABASE_URL` definido; sem ele cada teste retorna cedo.
//! Cada teste ganha um schema próprio (search_path na conexão), apagado no fim.
//! Superusuário e BYPASSRLS ignoram o RLS, então nesses casos a pool assume um
//! papel comum, dono do schema, que fica sujeito ao FORCE ROW LEVEL SECURITY.

use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, PgConnection, PgPool, Postgres, Transaction,
};
use uuid::Uuid;

use ops_crm::{access::default_catalog, db::PolicyRepository};

pub static MIGRATOR: Migrator = sqlx::migrate!();

const OWNER_ROLE: &str = "ops_crm_test_owner";

pub struct TestDb {
    pub pool: PgPool,
    pub schema: String,
}

impl TestDb {
    pub async fn connect() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL não definido; teste com banco ignorado");
            return Ok(None);
        };

        let schema = format!("ops_crm_test_{}", Uuid::new_v4().simple());
        let mut admin = PgConnection::connect(&url).await?;

        let (privileged,): (bool,) = sqlx::query_as(
            "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user",
        )
        .fetch_one(&mut admin)
        .await?;

        let mut options = vec![("search_path".to_string(), schema.clone())];
        if privileged {
            sqlx::raw_sql(&format!(
                r#"DO $$ BEGIN
    CREATE ROLE {OWNER_ROLE} NOLOGIN NOSUPERUSER NOBYPASSRLS;
EXCEPTION WHEN duplicate_object OR unique_violation THEN NULL; END $$"#
            ))
            .execute(&mut admin)
            .await?;
            sqlx::raw_sql(&format!("CREATE SCHEMA {schema} AUTHORIZATION {OWNER_ROLE}"))
                .execute(&mut admin)
                .await?;
            options.push(("role".to_string(), OWNER_ROLE.to_string()));
        } else {
            sqlx::raw_sql(&format!("CREATE SCHEMA {schema}"))
                .execute(&mut admin)
                .await?;
        }
        admin.close().await?;

        let connect_options = PgConnectOptions::from_str(&url)?
            .options(options.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(connect_options)
            .await?;

        Ok(Some(Self { pool, schema }))
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub async fn install_policies(&self) -> Result<()> {
        PolicyRepository::new(self.pool.clone())
            .install(&default_catalog())
            .await
    }

    /// Transação com a identidade do chamador, como a de uma requisição.
    pub async fn begin_as(&self, caller: Option<Uuid>) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT set_config('app.user_id', $1, true)")
            .bind(caller.map(|id| id.to_string()).unwrap_or_default())
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    /// Perfil gravado sob a própria identidade (a política de inserção exige isso).
    pub async fn create_profile(&self, email: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let mut tx = self.begin_as(Some(id)).await?;
        sqlx::query("INSERT INTO profiles (id, email) VALUES ($1, $2)")
            .bind(id)
            .bind(email)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(id)
    }

    pub async fn cleanup(self) -> Result<()> {
        sqlx::raw_sql(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.pool)
            .await?;
        self.pool.close().await;
        Ok(())
    }
}
