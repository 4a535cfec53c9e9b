//! Operator extractor for the administrative routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cipherswarm_core::error::CoreError;
use cipherswarm_core::hashing::sha256_hex;

use super::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the configured `ADMIN_API_TOKEN` as Bearer token.
///
/// Rejects with 403 when no admin token is configured and 401 when the
/// presented token does not match.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_token.as_deref() else {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin API is disabled".into(),
            )));
        };

        let presented = bearer_token(parts)?;
        // Compare digests so the comparison time does not depend on a shared prefix.
        if sha256_hex(presented.as_bytes()) != sha256_hex(expected.as_bytes()) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid admin token".into(),
            )));
        }
        Ok(RequireAdmin)
    }
}
