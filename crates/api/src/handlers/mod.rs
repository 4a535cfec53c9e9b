//! HTTP handlers, one module per route surface.
//!
//! Both client protocols share the response views defined here; they differ
//! only in envelope and error rendering.

pub mod admin;
pub mod client_v1;
pub mod client_v2;

use cipherswarm_core::error::CoreError;
use cipherswarm_core::status::AgentState;
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::agent::{Agent, RegisteredAgent};
use cipherswarm_db::models::task::Task;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Heartbeat body. The state is optional on both protocols.
#[derive(Debug, Default, Deserialize)]
pub struct HeartbeatRequest {
    #[serde(default)]
    pub state: Option<String>,
}

impl HeartbeatRequest {
    pub fn parsed_state(&self) -> Result<Option<AgentState>, CoreError> {
        self.state.as_deref().map(AgentState::parse).transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct StateRequest {
    pub state: String,
}

// ---------------------------------------------------------------------------
// Response views
// ---------------------------------------------------------------------------

/// An agent row with its state rendered by name.
#[derive(Debug, Serialize)]
pub struct AgentView {
    #[serde(flatten)]
    pub agent: Agent,
    pub state: &'static str,
}

impl TryFrom<Agent> for AgentView {
    type Error = CoreError;

    fn try_from(agent: Agent) -> Result<Self, Self::Error> {
        let state = agent.state()?.as_str();
        Ok(Self { agent, state })
    }
}

/// A task row with its status rendered by name.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub status: &'static str,
}

impl TryFrom<Task> for TaskView {
    type Error = CoreError;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        let status = task.status()?.as_str();
        Ok(Self { task, status })
    }
}

/// Registration result. The token is shown exactly once.
#[derive(Debug, Serialize)]
pub struct RegistrationView {
    pub agent_id: DbId,
    pub token: String,
    pub agent: AgentView,
}

impl TryFrom<RegisteredAgent> for RegistrationView {
    type Error = CoreError;

    fn try_from(registered: RegisteredAgent) -> Result<Self, Self::Error> {
        Ok(Self {
            agent_id: registered.agent.id,
            token: registered.token,
            agent: registered.agent.try_into()?,
        })
    }
}
