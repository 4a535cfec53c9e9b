//! Typed payloads attached to a task by its holder.
//!
//! Progress updates, final results and failures each carry their own shape;
//! the task row keeps the latest one in its `details` column.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum stored length of a failure message.
pub const MAX_FAILURE_MESSAGE_LEN: usize = 1024;

/// Payload stored on the task row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskDetails {
    Progress(ProgressUpdate),
    Result {
        cracked_hashes: Vec<String>,
        runtime_secs: Option<i64>,
        exit_code: Option<i32>,
    },
    Error {
        message: String,
        exit_code: Option<i32>,
    },
}

/// Lightweight progress report, separate from full status telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress_percent: f64,
    pub keyspace_processed: i64,
}

impl ProgressUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=100.0).contains(&self.progress_percent) {
            return Err(CoreError::Validation(format!(
                "progress_percent must be between 0 and 100, got {}",
                self.progress_percent
            )));
        }
        if self.keyspace_processed < 0 {
            return Err(CoreError::Validation(
                "keyspace_processed must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Final outcome submitted by the task holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskResult {
    Success {
        #[serde(default)]
        cracked_hashes: Vec<String>,
        runtime_secs: Option<i64>,
        exit_code: Option<i32>,
    },
    Failure {
        message: String,
        exit_code: Option<i32>,
    },
}

impl TaskResult {
    /// Whether this result moves the task to `FAILED`.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskResult::Failure { .. })
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            TaskResult::Success { runtime_secs, .. } => {
                if runtime_secs.is_some_and(|secs| secs < 0) {
                    return Err(CoreError::Validation(
                        "runtime_secs must not be negative".into(),
                    ));
                }
            }
            TaskResult::Failure { message, .. } => {
                if message.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "failure result requires a message".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Convert into the stored task payload.
    pub fn into_details(self) -> TaskDetails {
        match self {
            TaskResult::Success {
                cracked_hashes,
                runtime_secs,
                exit_code,
            } => TaskDetails::Result {
                cracked_hashes,
                runtime_secs,
                exit_code,
            },
            TaskResult::Failure { message, exit_code } => TaskDetails::Error {
                message: message.chars().take(MAX_FAILURE_MESSAGE_LEN).collect(),
                exit_code,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn details_are_tagged_by_kind() {
        let details = TaskDetails::Progress(ProgressUpdate {
            progress_percent: 12.5,
            keyspace_processed: 125,
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "progress");
        assert_eq!(json["keyspace_processed"], 125);
    }

    #[test]
    fn result_outcome_parses_from_wire() {
        let result: TaskResult = serde_json::from_value(serde_json::json!({
            "outcome": "failure",
            "message": "hashcat exited with code 255",
            "exit_code": 255
        }))
        .unwrap();
        assert!(result.is_failure());
    }

    #[test]
    fn failure_without_message_is_invalid() {
        let result = TaskResult::Failure {
            message: "  ".into(),
            exit_code: None,
        };
        assert_matches!(result.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn failure_message_is_truncated_when_stored() {
        let result = TaskResult::Failure {
            message: "x".repeat(MAX_FAILURE_MESSAGE_LEN + 50),
            exit_code: Some(1),
        };
        assert_matches!(
            result.into_details(),
            TaskDetails::Error { message, .. } if message.len() == MAX_FAILURE_MESSAGE_LEN
        );
    }

    #[test]
    fn progress_out_of_range_is_invalid() {
        let update = ProgressUpdate {
            progress_percent: 101.0,
            keyspace_processed: 0,
        };
        assert_matches!(update.validate(), Err(CoreError::Validation(_)));
    }
}
