//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit is one variant here, and `AppError` implements
//! `actix_web::error::ResponseError` so handlers can simply return it.
//!
//! Client-facing messages are deliberately minimal: storage, hashing and signing
//! failures are logged with their detail and rendered as a generic message.
//! `From` implementations for `sqlx::Error` and `validator::ValidationErrors`
//! allow conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::{error, warn};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Input failed field validation (HTTP 422).
    ValidationError(String),
    /// Malformed request that never reached validation (HTTP 400).
    BadRequest(String),
    /// Registration for an email that is already taken (HTTP 400).
    DuplicateEmail,
    /// Login failure. Covers both "no such user" and "wrong password" (HTTP 401).
    InvalidCredentials,
    /// Missing, malformed or expired token (HTTP 401).
    Unauthorized(String),
    /// Resource absent or owned by another subject; the two are never distinguished (HTTP 404).
    NotFound(String),
    /// Identifier that is not a valid UUID (HTTP 400).
    InvalidId,
    /// Underlying persistence failure (HTTP 500).
    DatabaseError(String),
    /// Password hashing failed (HTTP 500).
    HashingError(String),
    /// Token signing failed (HTTP 500).
    TokenSigningError(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Store timed out or cancelled the operation (HTTP 503).
    ServiceUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::DuplicateEmail => write!(f, "Email already registered"),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InvalidId => write!(f, "Invalid todo ID format"),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::HashingError(msg) => write!(f, "Hashing Error: {}", msg),
            AppError::TokenSigningError(msg) => write!(f, "Token Signing Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
        }
    }
}

impl AppError {
    /// The message shown to the client. Never contains internal detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::DuplicateEmail
            | AppError::InvalidCredentials
            | AppError::InvalidId => self.to_string(),
            AppError::DatabaseError(_)
            | AppError::HashingError(_)
            | AppError::TokenSigningError(_)
            | AppError::InternalServerError(_) => GENERIC_MESSAGE.to_string(),
            AppError::ServiceUnavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects with a `{"error": ...}` body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) | AppError::DuplicateEmail | AppError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::HashingError(_)
            | AppError::TokenSigningError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            if status == StatusCode::SERVICE_UNAVAILABLE {
                warn!("{}", self);
            } else {
                error!("{}", self);
            }
        }
        HttpResponse::build(status).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Pool exhaustion and cancelled statements become `ServiceUnavailable`;
/// everything else is a `DatabaseError` whose detail stays server-side.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::PoolTimedOut => AppError::ServiceUnavailable(error.to_string()),
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("57014") => {
                // query_canceled, raised when statement_timeout fires
                AppError::ServiceUnavailable(error.to_string())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
