//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! represent the failure taxonomy: validation failures, authentication and
//! authorization denials, missing records, registration conflicts, and
//! unexpected store failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into HTTP responses with JSON bodies. Authentication
//! failures and internal errors are surfaced with generic bodies; the specific
//! reason is logged instead, so the response never reveals which check failed.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` allow conversion
//! with the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed: missing, revoked, expired, or unverifiable
    /// token, or the token's user no longer exists (HTTP 401).
    /// The carried message is logged, never sent to the client.
    Unauthenticated(String),
    /// The caller is authenticated but not entitled to act on the resource,
    /// e.g. touching another user's task (HTTP 403).
    Forbidden(String),
    /// A referenced entity does not exist (HTTP 404).
    NotFound(String),
    /// Registration conflict: the email is already taken (HTTP 409).
    DuplicateEmail(String),
    /// Input failed validation (HTTP 422 Unprocessable Entity).
    /// Wraps errors from the `validator` crate with field-level detail.
    Validation(String),
    /// An error originating from database operations (HTTP 500).
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::DuplicateEmail(msg) => write!(f, "Duplicate Email: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Actix Web uses this to translate `AppError` results from handlers into the
/// correct status codes and JSON error bodies.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated(msg) => {
                // Generic denial: do not leak which auth check failed.
                log::warn!("authentication denied: {}", msg);
                HttpResponse::Unauthorized().json(json!({
                    "error": "Not authorized"
                }))
            }
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::DuplicateEmail(msg) => HttpResponse::Conflict().json(json!({
                "error": msg
            })),
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            AppError::Database(msg) | AppError::Internal(msg) => {
                // Store failures are opaque to the caller.
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; a unique-constraint violation maps to
/// `DuplicateEmail` (the only unique constraint in the schema is the user
/// email, and this backs the checked-then-insert race window at registration);
/// everything else becomes `Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEmail("Email already registered".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// preserving the field-level detail.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthenticated`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
