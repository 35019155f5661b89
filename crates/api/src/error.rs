use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use content_engine_core::error::CoreError;
use content_engine_db::StoreError;
use serde_json::{json, Value};

use crate::automation::AutomationError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoreError`] for domain and persistence errors
/// and adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent `{ error, code, details? }` JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `content_engine_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the project store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A request body that failed to parse or validate.
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String, details: Value },

    /// A call to the automation service failed.
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
        details: Value,
    },

    /// A required integration is not configured on this deployment.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<AutomationError> for AppError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::NotConfigured => {
                AppError::NotConfigured(AutomationError::NotConfigured.to_string())
            }
            AutomationError::Request(e) => AppError::Upstream {
                message: "Failed to reach automation service".to_string(),
                status: None,
                details: json!({ "reason": e.to_string() }),
            },
            AutomationError::HttpStatus { status, body } => AppError::Upstream {
                message: format!("Automation workflow failed with HTTP {status}"),
                status: Some(status),
                details: json!({ "status": status, "body": body }),
            },
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Core(core) => {
                let (status, code, message) = classify_core_error(core);
                (status, code, message, None)
            }
            AppError::Store(store) => {
                let (status, code, message) = classify_store_error(store);
                (status, code, message, None)
            }
            AppError::InvalidPayload { message, details } => (
                StatusCode::BAD_REQUEST,
                "INVALID_PAYLOAD",
                message,
                Some(details),
            ),
            AppError::Upstream {
                message,
                status,
                details,
            } => {
                tracing::warn!(upstream_status = ?status, error = %message, "Upstream failure");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message, Some(details))
            }
            AppError::NotConfigured(msg) => {
                tracing::error!(error = %msg, "Missing integration configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOT_CONFIGURED",
                    msg,
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details.filter(|d| !d.is_null()) {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Domain errors raised inside an update keep their own mapping.
/// - Exhausted optimistic retries map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Core(core) => classify_core_error(core),
        StoreError::Contention { id, .. } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Project {id} is being modified concurrently, retry the request"),
        ),
        other => {
            tracing::error!(error = %other, "Project store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
