// src/services/task_service.rs

use std::sync::Arc;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    access::{GovernedRow, PolicySet, RowFacts, Table},
    common::error::AppError,
    db::TaskRepository,
    models::{
        identity::Caller,
        tasks::{Task, TaskGroup, TaskGroupPayload, TaskPayload},
    },
};

// Grupos e tarefas são da equipe: qualquer autenticado lê e escreve
#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    policies: Arc<PolicySet>,
}

impl TaskService {
    pub fn new(repo: TaskRepository, policies: Arc<PolicySet>) -> Self {
        Self { repo, policies }
    }

    // =========================================================================
    //  GRUPOS
    // =========================================================================

    pub async fn list_groups(&self, conn: &mut PgConnection, caller: &Caller) -> Result<Vec<TaskGroup>, AppError> {
        let groups = self.repo.list_groups(&mut *conn).await?;
        Ok(self.policies.visible(caller, groups))
    }

    pub async fn create_group(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        payload: &TaskGroupPayload,
    ) -> Result<TaskGroup, AppError> {
        self.policies
            .authorize_insert(Table::TaskGroups, caller, &RowFacts::default())
            .ensure(Table::TaskGroups)?;
        self.repo.create_group(&mut *conn, payload).await
    }

    pub async fn update_group(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        payload: &TaskGroupPayload,
    ) -> Result<TaskGroup, AppError> {
        let existing = self
            .repo
            .find_group_for_update(&mut *conn, id)
            .await?
            .filter(|group| self.policies.can_read(caller, group))
            .ok_or(AppError::NotFound)?;

        self.policies
            .authorize_update(Table::TaskGroups, caller, &existing.facts(), &RowFacts::default())
            .ensure(Table::TaskGroups)?;
        self.repo.update_group(&mut *conn, id, payload).await
    }

    pub async fn delete_group(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let existing = self
            .repo
            .find_group_for_update(&mut *conn, id)
            .await?
            .filter(|group| self.policies.can_read(caller, group))
            .ok_or(AppError::NotFound)?;

        self.policies
            .authorize_delete(Table::TaskGroups, caller, &existing.facts())
            .ensure(Table::TaskGroups)?;

        // As tarefas do grupo ficam sem grupo (ON DELETE SET NULL)
        if !self.repo.delete_group(&mut *conn, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn list_tasks(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = self.repo.list_tasks(&mut *conn, group_id).await?;
        Ok(self.policies.visible(caller, tasks))
    }

    pub async fn create_task(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        payload: &TaskPayload,
    ) -> Result<Task, AppError> {
        self.policies
            .authorize_insert(Table::Tasks, caller, &payload.facts())
            .ensure(Table::Tasks)?;
        self.repo.create_task(&mut *conn, payload).await
    }

    pub async fn update_task(
        &self,
        conn: &mut PgConnection,
        caller: &Caller,
        id: Uuid,
        payload: &TaskPayload,
    ) -> Result<Task, AppError> {
        let existing = self.lock_visible_task(conn, caller, id).await?;
        self.policies
            .authorize_update(Table::Tasks, caller, &existing.facts(), &payload.facts())
            .ensure(Table::Tasks)?;
        self.repo.update_task(&mut *conn, id, payload).await
    }

    pub async fn delete_task(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let existing = self.lock_visible_task(conn, caller, id).await?;
        self.policies
            .authorize_delete(Table::Tasks, caller, &existing.facts())
            .ensure(Table::Tasks)?;

        if !self.repo.delete_task(&mut *conn, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn lock_visible_task(&self, conn: &mut PgConnection, caller: &Caller, id: Uuid) -> Result<Task, AppError> {
        self.repo
            .find_task_for_update(&mut *conn, id)
            .await?
            .filter(|task| self.policies.can_read(caller, task))
            .ok_or(AppError::NotFound)
    }
}
