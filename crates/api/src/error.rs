use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobs2go_core::error::CoreError;
use serde_json::json;

/// Generic message returned for every 500.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Whether 500 responses carry the underlying error text. Set once at
/// start-up; only development deployments enable it.
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Enable or disable internal error details in responses.
pub fn set_expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jobs2go_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, code, message, and extra body fields for one error.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<Vec<String>>,
    details: Option<String>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
            details: None,
        }
    }

    fn internal(underlying: &str) -> Self {
        let mut parts = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        );
        parts.details = internal_details(underlying, EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed));
        parts
    }
}

fn internal_details(underlying: &str, expose: bool) -> Option<String> {
    expose.then(|| underlying.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorParts::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::NotFoundMessage(msg) => {
                    ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
                }
                CoreError::Validation(msg) => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::ValidationList(errors) => {
                    let mut parts = ErrorParts::new(
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        "Validation error",
                    );
                    parts.errors = Some(errors.clone());
                    parts
                }
                CoreError::Conflict(msg) => {
                    ErrorParts::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    ErrorParts::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    ErrorParts::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorParts::internal(msg)
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorParts::internal(msg)
            }
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(errors) = parts.errors {
            body["errors"] = json!(errors);
        }
        if let Some(details) = parts.details {
            body["details"] = json!(details);
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return ErrorParts::new(
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorParts::internal(&db_err.to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal(&other.to_string())
        }
    }
}
