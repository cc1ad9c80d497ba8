// src/db/profile_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, Role},
};

#[derive(Clone, Default)]
pub struct ProfileRepository;

impl ProfileRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, role, avatar_url, created_at, updated_at
            FROM profiles
            ORDER BY full_name NULLS LAST, email
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(profiles)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, role, avatar_url, created_at, updated_at
            FROM profiles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(profile)
    }

    // UPSERT: o primeiro PUT cria o perfil, os seguintes atualizam
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        email: &str,
        full_name: Option<&str>,
        role: Option<Role>,
        avatar_url: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, full_name, role, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
            RETURNING id, email, full_name, role, avatar_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(full_name)
        .bind(role)
        .bind(avatar_url)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }
}
