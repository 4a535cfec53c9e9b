//! Agent error report normalization.

use serde::{Deserialize, Serialize};

use crate::status::ErrorSeverity;
use crate::types::DbId;

/// Maximum stored length of an error message.
pub const MAX_MESSAGE_LEN: usize = 512;

/// An error reported by an agent, after severity parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentErrorReport {
    pub severity: ErrorSeverity,
    pub message: String,
    pub error_code: Option<String>,
    pub details: Option<serde_json::Value>,
    pub task_id: Option<DbId>,
}

/// Wire shape of an error report; `severity` is parsed by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentErrorInput {
    pub severity: String,
    pub message: String,
    pub error_code: Option<String>,
    pub details: Option<serde_json::Value>,
    pub task_id: Option<DbId>,
}

impl AgentErrorInput {
    /// Parse severity and sanitize the message.
    pub fn into_report(self) -> Result<AgentErrorReport, crate::error::CoreError> {
        Ok(AgentErrorReport {
            severity: ErrorSeverity::parse(&self.severity)?,
            message: sanitize_message(&self.message),
            error_code: self.error_code,
            details: self.details,
            task_id: self.task_id,
        })
    }
}

/// Strip NUL bytes (PostgreSQL rejects them in text) and cap the length.
pub fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| *c != '\0')
        .take(MAX_MESSAGE_LEN)
        .collect()
}
