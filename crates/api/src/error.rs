use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookshelf_core::error::CoreError;
use bookshelf_db::StoreError;
use serde_json::json;

use crate::services::{AuthError, BookError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and the service errors, and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{"error": <message>, "code": <CODE>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bookshelf_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Book(#[from] BookError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type ErrorParts = (StatusCode, &'static str, String);

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn audit_unavailable() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "AUDIT_ERROR",
        "Audit sink unavailable".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Authentication ---
            AppError::Auth(err) => match err {
                AuthError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                AuthError::DuplicateEmail => {
                    (StatusCode::CONFLICT, "CONFLICT", err.to_string())
                }
                AuthError::UserNotFound => {
                    (StatusCode::BAD_REQUEST, "USER_NOT_FOUND", err.to_string())
                }
                AuthError::SessionNotFound => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Invalid or already used refresh token".to_string(),
                ),
                AuthError::RefreshTokenExpired => (
                    StatusCode::UNAUTHORIZED,
                    "REFRESH_TOKEN_EXPIRED",
                    err.to_string(),
                ),
                AuthError::InvalidToken | AuthError::InvalidSubject => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Invalid or expired token".to_string(),
                ),
                AuthError::Persistence(store) => classify_store_error(store),
                AuthError::Audit(audit) => {
                    tracing::error!(error = %audit, "Audit failure during auth flow");
                    audit_unavailable()
                }
                AuthError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal auth error");
                    internal()
                }
            },

            // --- Books ---
            AppError::Book(err) => match err {
                BookError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                BookError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                BookError::Persistence(store) => classify_store_error(store),
                BookError::Audit(audit) => {
                    tracing::error!(error = %audit, "Audit failure during book operation");
                    audit_unavailable()
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Cancellation maps to 408; the client rarely sees it.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> ErrorParts {
    match err {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        StoreError::UniqueViolation(constraint) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::Cancelled => (
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_CANCELLED",
            "Request was cancelled".to_string(),
        ),
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "Database error");
            internal()
        }
    }
}
