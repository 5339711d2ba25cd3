use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::repository::{InMemoryTodoRepository, InMemoryUserRepository, TodoRepository, UserRepository};

/// Shared, read-only application state handed to every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub todos: Arc<dyn TodoRepository>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        todos: Arc<dyn TodoRepository>,
        tokens: TokenService,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            todos,
            tokens,
            hasher,
        }
    }

    /// Builds the token service and hasher from `config` around the given stores.
    pub fn from_config(
        config: &Config,
        users: Arc<dyn UserRepository>,
        todos: Arc<dyn TodoRepository>,
    ) -> Self {
        Self::new(
            users,
            todos,
            TokenService::new(&config.jwt_secret, config.jwt_expire_hours),
            PasswordHasher::new(config.bcrypt_cost),
        )
    }

    /// State backed by fresh in-memory stores.
    pub fn in_memory(tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTodoRepository::new()),
            tokens,
            hasher,
        )
    }
}
