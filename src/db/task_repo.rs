// src/db/task_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tasks::{Task, TaskGroup, TaskGroupPayload, TaskPayload},
};

const TASK_COLUMNS: &str = r#"
    id, group_id, title, description, status, due_date,
    assigned_to, is_shared, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  GRUPOS
    // =========================================================================

    pub async fn list_groups<'e, E>(&self, executor: E) -> Result<Vec<TaskGroup>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let groups = sqlx::query_as::<_, TaskGroup>(
            "SELECT id, name, color, created_at FROM task_groups ORDER BY name",
        )
        .fetch_all(executor)
        .await?;
        Ok(groups)
    }

    pub async fn find_group_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TaskGroup>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, TaskGroup>(
            "SELECT id, name, color, created_at FROM task_groups WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(group)
    }

    pub async fn create_group<'e, E>(&self, executor: E, payload: &TaskGroupPayload) -> Result<TaskGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, TaskGroup>(
            r#"
            INSERT INTO task_groups (name, color)
            VALUES ($1, $2)
            RETURNING id, name, color, created_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.color)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn update_group<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &TaskGroupPayload,
    ) -> Result<TaskGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, TaskGroup>(
            r#"
            UPDATE task_groups SET name = $2, color = $3
            WHERE id = $1
            RETURNING id, name, color, created_at
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.color)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn delete_group<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM task_groups WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn list_tasks<'e, E>(&self, executor: E, group_id: Option<Uuid>) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE ($1::uuid IS NULL OR group_id = $1)
            ORDER BY due_date NULLS LAST, created_at
            "#
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(group_id)
            .fetch_all(executor)
            .await?;
        Ok(tasks)
    }

    pub async fn find_task_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn create_task<'e, E>(&self, executor: E, payload: &TaskPayload) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO tasks (group_id, title, description, status, due_date, assigned_to, is_shared)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(payload.group_id)
            .bind(payload.title.trim())
            .bind(&payload.description)
            .bind(payload.status)
            .bind(payload.due_date)
            .bind(payload.assigned_to)
            .bind(payload.is_shared)
            .fetch_one(executor)
            .await?;
        Ok(task)
    }

    pub async fn update_task<'e, E>(&self, executor: E, id: Uuid, payload: &TaskPayload) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE tasks SET
                group_id = $2,
                title = $3,
                description = $4,
                status = $5,
                due_date = $6,
                assigned_to = $7,
                is_shared = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(payload.group_id)
            .bind(payload.title.trim())
            .bind(&payload.description)
            .bind(payload.status)
            .bind(payload.due_date)
            .bind(payload.assigned_to)
            .bind(payload.is_shared)
            .fetch_one(executor)
            .await?;
        Ok(task)
    }

    pub async fn delete_task<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
