//! Capability-token extractor for agent routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::agent::Agent;

use super::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// The agent that owns the Bearer token on this request.
///
/// ```ignore
/// async fn my_handler(auth: AuthAgent) -> AppResult<Json<()>> {
///     tracing::info!(agent_id = auth.agent_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthAgent {
    pub agent_id: DbId,
    pub agent: Agent,
}

impl FromRequestParts<AppState> for AuthAgent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let agent = state.coordinator.authenticate(token).await?;

        Ok(AuthAgent {
            agent_id: agent.id,
            agent,
        })
    }
}
