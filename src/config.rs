use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted token lifetime: one year.
pub const MAX_JWT_EXPIRE_HOURS: i64 = 24 * 366;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at start-up and handed to `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. When unset the service runs on in-memory stores.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Bounds both pool acquisition and statement execution.
    pub database_timeout_secs: u64,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
    pub bcrypt_cost: u32,
    pub frontend_url: Option<String>,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bcrypt_cost = parse_or(&non_empty, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let jwt_expire_hours = parse_or(&non_empty, "JWT_EXPIRE_HOURS", 24_i64)?;
        if !(1..=MAX_JWT_EXPIRE_HOURS).contains(&jwt_expire_hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRE_HOURS",
                value: jwt_expire_hours.to_string(),
            });
        }

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse_or(&non_empty, "DATABASE_MAX_CONNECTIONS", 10)?,
            database_timeout_secs: parse_or(&non_empty, "DATABASE_TIMEOUT_SECS", 5)?,
            server_port: parse_or(&non_empty, "SERVER_PORT", 8080)?,
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_expire_hours,
            bcrypt_cost,
            frontend_url: non_empty("FRONTEND_URL"),
            app_env: non_empty("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
