//! Request extractors for the two kinds of callers.
//!
//! - [`agent_auth::AuthAgent`] -- an agent identified by its capability token.
//! - [`admin::RequireAdmin`] -- an operator holding `ADMIN_API_TOKEN`.

pub mod admin;
pub mod agent_auth;

use axum::http::request::Parts;
use cipherswarm_core::error::CoreError;

use crate::error::AppError;

/// The token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}
