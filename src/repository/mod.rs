//! Persistence contracts.
//!
//! `UserRepository` is the credential store; `TodoRepository` is scoped by
//! owner on every call. Both have a PostgreSQL and an in-memory implementation.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};

pub use in_memory::{InMemoryTodoRepository, InMemoryUserRepository};
pub use postgres::{PostgresTodoRepository, PostgresUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Looks a user up by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Inserts a user. Fails with `AppError::DuplicateEmail` when the email is
    /// taken, including when a concurrent registration won the race.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
}

/// Todo storage. Every operation is filtered by `user_id`; a record owned by
/// someone else behaves exactly like one that does not exist.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Stores a new todo owned by `user_id`.
    async fn create(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, AppError>;

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, AppError>;

    /// Merges `patch` into the stored todo. Zero matches is `AppError::NotFound`.
    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<Todo, AppError>;

    /// Zero matches is `AppError::NotFound`.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError>;

    /// Todos of `user_id` in creation order, optionally filtered by completion.
    async fn list(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        limit: i64,
    ) -> Result<Vec<Todo>, AppError>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError>;
}

pub(crate) fn todo_not_found() -> AppError {
    AppError::NotFound("Todo not found".into())
}
