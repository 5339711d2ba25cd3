//! In-memory repositories, used when no database is configured and by the tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{todo_not_found, TodoRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<Uuid, User>,
    /// Unique index: normalized email -> user id
    email_index: HashMap<String, Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.table.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        if table.email_index.contains_key(&user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let user = User::new(user);
        table.email_index.insert(user.email.clone(), user.id);
        table.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Todos kept in insertion order, so listing needs no sort.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, AppError> {
        let todo = Todo::new(todo, user_id);
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Todo>, AppError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn update(&self, id: Uuid, user_id: Uuid, patch: TodoPatch) -> Result<Todo, AppError> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .ok_or_else(todo_not_found)?;
        todo.apply(patch);
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut todos = self.todos.write().await;
        let position = todos
            .iter()
            .position(|t| t.id == id && t.user_id == user_id)
            .ok_or_else(todo_not_found)?;
        todos.remove(position);
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        limit: i64,
    ) -> Result<Vec<Todo>, AppError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| completed.map_or(true, |c| t.completed == c))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let todos = self.todos.read().await;
        Ok(todos.iter().filter(|t| t.user_id == user_id).count() as i64)
    }
}
