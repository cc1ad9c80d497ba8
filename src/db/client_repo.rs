// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Client, ClientDraft},
};

const CLIENT_COLUMNS: &str = r#"
    id, company_name, contact_name, email, phone, pipeline_stage,
    number_of_cars, commitment_length, per_car_value, setup_fee,
    assigned_to, notes, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC");
        let clients = sqlx::query_as::<_, Client>(&sql).fetch_all(executor).await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Mesma busca, travando a linha até o fim da transação (antes de UPDATE/DELETE).
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1 FOR UPDATE");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    pub async fn create<'e, E>(&self, executor: E, draft: &ClientDraft) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (
                company_name, contact_name, email, phone, pipeline_stage,
                number_of_cars, commitment_length, per_car_value, setup_fee,
                assigned_to, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(&draft.company_name)
            .bind(&draft.contact_name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(draft.pipeline_stage)
            .bind(draft.terms.number_of_cars)
            .bind(draft.terms.commitment_length)
            .bind(draft.terms.per_car_value)
            .bind(draft.terms.setup_fee)
            .bind(draft.assigned_to)
            .bind(&draft.notes)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    // PUT = substituição completa
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, draft: &ClientDraft) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients SET
                company_name = $2,
                contact_name = $3,
                email = $4,
                phone = $5,
                pipeline_stage = $6,
                number_of_cars = $7,
                commitment_length = $8,
                per_car_value = $9,
                setup_fee = $10,
                assigned_to = $11,
                notes = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        // fetch_one: RowNotFound vira AppError::NotFound
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(&draft.company_name)
            .bind(&draft.contact_name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(draft.pipeline_stage)
            .bind(draft.terms.number_of_cars)
            .bind(draft.terms.commitment_length)
            .bind(draft.terms.per_car_value)
            .bind(draft.terms.setup_fee)
            .bind(draft.assigned_to)
            .bind(&draft.notes)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    pub async fn set_owner<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE clients SET assigned_to = $2, updated_at = NOW() WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(assigned_to)
            .fetch_one(executor)
            .await?;
        Ok(client)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
