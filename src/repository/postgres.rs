//! PostgreSQL repositories.

use async_trait::async_trait;
use log::info;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use super::{todo_not_found, TodoRepository, UserRepository};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at, updated_at";
const TODO_COLUMNS: &str =
    "id, user_id, title, description, completed, priority, tags, due_date, created_at, updated_at";

/// Opens the connection pool.
///
/// `DATABASE_TIMEOUT_SECS` bounds both waiting for a connection and every
/// statement run on it, so a stalled database fails requests instead of
/// holding them.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;
    let timeout = Duration::from_secs(config.database_timeout_secs);

    let options = PgConnectOptions::from_str(url)?
        .options([("statement_timeout", timeout.as_millis().to_string())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await?;

    info!(
        "Connected to PostgreSQL (max {} connections)",
        config.database_max_connections
    );
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = User::new(user);
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // The unique index on email settles concurrent registrations.
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail
            }
            other => other.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn create(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, AppError> {
        let todo = Todo::new(todo, user_id);
        let created = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (id, user_id, title, description, completed, priority, tags, due_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.priority)
        .bind(&todo.tags)
        .bind(todo.due_date)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<Todo, AppError> {
        // One statement: the merge and the ownership check cannot interleave with another write.
        sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                completed = COALESCE($5, completed),
                priority = COALESCE($6, priority),
                tags = COALESCE($7, tags),
                due_date = COALESCE($8, due_date),
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.completed)
        .bind(patch.priority)
        .bind(patch.tags)
        .bind(patch.due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(todo_not_found)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(todo_not_found());
        }
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        limit: i64,
    ) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos
             WHERE user_id = $1 AND ($2::boolean IS NULL OR completed = $2)
             ORDER BY created_at, id
             LIMIT $3",
            TODO_COLUMNS
        ))
        .bind(user_id)
        .bind(completed)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
