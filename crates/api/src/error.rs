use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cipherswarm_coordinator::CoordError;
use cipherswarm_core::error::{CoreError, TaskConflict};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Renders the canonical mapping used by the v2 client and admin routes as
/// `{"error", "code"}` JSON. The legacy v1 surface wraps it in [`V1Error`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<CoordError> for AppError {
    fn from(err: CoordError) -> Self {
        match err {
            CoordError::Core(core) => AppError::Core(core),
            CoordError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::HashNotInTargetSet { .. } => (
                    StatusCode::NOT_FOUND,
                    "HASH_NOT_FOUND",
                    core.to_string(),
                ),
                CoreError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    msg.clone(),
                ),
                CoreError::TaskConflict { conflict, .. } => (
                    StatusCode::CONFLICT,
                    conflict_code(*conflict),
                    core.to_string(),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

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

fn conflict_code(conflict: TaskConflict) -> &'static str {
    match conflict {
        TaskConflict::AlreadyCompleted => "TASK_ALREADY_COMPLETED",
        TaskConflict::AlreadyAbandoned => "TASK_ALREADY_ABANDONED",
        TaskConflict::AlreadyFailed => "TASK_ALREADY_FAILED",
        TaskConflict::AlreadyRunning => "TASK_ALREADY_RUNNING",
        TaskConflict::NotRunning => "TASK_NOT_RUNNING",
        TaskConflict::NotPaused => "TASK_NOT_PAUSED",
        TaskConflict::AgentBusy => "AGENT_BUSY",
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy v1 client mapping
// ---------------------------------------------------------------------------

/// Error rendering for the legacy v1 agent protocol.
///
/// Existing agents expect a missing task and a task held by someone else to
/// look the same (404 `Record not found`), `409` only for a task that is not
/// running, and `422` for every other state conflict or validation failure.
#[derive(Debug)]
pub struct V1Error(pub AppError);

pub type V1Result<T> = Result<T, V1Error>;

impl From<AppError> for V1Error {
    fn from(err: AppError) -> Self {
        V1Error(err)
    }
}

impl From<CoordError> for V1Error {
    fn from(err: CoordError) -> Self {
        V1Error(err.into())
    }
}

impl From<CoreError> for V1Error {
    fn from(err: CoreError) -> Self {
        V1Error(AppError::Core(err))
    }
}

impl IntoResponse for V1Error {
    fn into_response(self) -> Response {
        match legacy_status(&self.0) {
            Some((status, message)) => {
                (status, axum::Json(json!({ "error": message }))).into_response()
            }
            None => self.0.into_response(),
        }
    }
}

/// Legacy status and message, or `None` to fall back to the canonical body.
fn legacy_status(err: &AppError) -> Option<(StatusCode, String)> {
    let AppError::Core(core) = err else {
        return None;
    };
    let mapped = match core {
        CoreError::NotFound { .. } | CoreError::Forbidden(_) => {
            (StatusCode::NOT_FOUND, "Record not found".to_string())
        }
        CoreError::HashNotInTargetSet { .. } => {
            (StatusCode::NOT_FOUND, "Hash not found".to_string())
        }
        CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),
        CoreError::TaskConflict {
            conflict: TaskConflict::NotRunning,
            ..
        } => (StatusCode::CONFLICT, "Task not running".to_string()),
        CoreError::TaskConflict { conflict, .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            capitalize(&conflict.to_string()),
        ),
        CoreError::Validation(msg) | CoreError::Conflict(msg) => {
            (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
        }
        CoreError::Internal(_) => return None,
    };
    Some(mapped)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
