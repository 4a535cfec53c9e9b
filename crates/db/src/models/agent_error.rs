use cipherswarm_core::status::StatusId;
use cipherswarm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `agent_errors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AgentError {
    pub id: DbId,
    pub agent_id: DbId,
    pub task_id: Option<DbId>,
    pub severity_id: StatusId,
    pub message: String,
    pub error_code: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}
