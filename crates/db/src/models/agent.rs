//! Agent entity and registration DTO.

use cipherswarm_core::error::CoreError;
use cipherswarm_core::status::{AgentState, StatusId};
use cipherswarm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `agents` table. The token digest is never selected.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agent {
    pub id: DbId,
    pub host_name: String,
    pub client_signature: String,
    pub operating_system: String,
    pub agent_type: Option<String>,
    pub state_id: StatusId,
    pub enabled: bool,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Agent {
    pub fn state(&self) -> Result<AgentState, CoreError> {
        AgentState::from_id(self.state_id)
    }
}

/// Identity an agent presents at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAgent {
    pub host_name: String,
    pub client_signature: String,
    pub operating_system: String,
    pub agent_type: Option<String>,
}

/// Result of registration: the new row plus the one-time plaintext token.
#[derive(Debug, Clone)]
pub struct RegisteredAgent {
    pub agent: Agent,
    pub token: String,
}
