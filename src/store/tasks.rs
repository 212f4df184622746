use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{PublicOwner, Task, TaskUpdate};

/// Persistence for task records. No pagination: collections are scanned in
/// full, which is acceptable at this scope. Ownership checks happen in the
/// handlers; the store only filters where the query itself is owner-scoped.
#[derive(Clone)]
pub struct TaskStore {
    pool: PgPool,
}

impl TaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task: &Task) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, is_completed, is_public, owner, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, title, description, is_completed, is_public, owner, created_at",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(task.is_public)
        .bind(task.owner)
        .bind(task.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, is_completed, is_public, owner, created_at
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, is_completed, is_public, owner, created_at
             FROM tasks WHERE owner = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn list_public_by_owner(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, is_completed, is_public, owner, created_at
             FROM tasks WHERE owner = $1 AND is_public = TRUE ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Users with at least one public task, with the fields the public index
    /// exposes (name and email; these users opted into sharing).
    pub async fn distinct_public_owners(&self) -> Result<Vec<PublicOwner>, AppError> {
        let owners = sqlx::query_as::<_, PublicOwner>(
            "SELECT u.id, u.firstname, u.lastname, u.email
             FROM users u
             WHERE u.id IN (SELECT DISTINCT owner FROM tasks WHERE is_public = TRUE)
             ORDER BY u.email",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(owners)
    }

    pub async fn update(&self, id: Uuid, fields: &TaskUpdate) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = $1, description = $2, is_completed = $3
             WHERE id = $4
             RETURNING id, title, description, is_completed, is_public, owner, created_at",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.is_completed)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn set_public(&self, id: Uuid, is_public: bool) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET is_public = $1 WHERE id = $2
             RETURNING id, title, description, is_completed, is_public, owner, created_at",
        )
        .bind(is_public)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn set_completed(&self, id: Uuid, is_completed: bool) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET is_completed = $1 WHERE id = $2
             RETURNING id, title, description, is_completed, is_public, owner, created_at",
        )
        .bind(is_completed)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }

        Ok(())
    }
}
