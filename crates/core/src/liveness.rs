//! Liveness policy for agents that stop reporting.
//!
//! There is no built-in deadline. The monitor only runs when an operator
//! configures one.

use std::time::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// When an agent counts as silently absent, and how often to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    pub deadline: Duration,
    pub check_interval: Duration,
}

impl LivenessPolicy {
    pub fn new(deadline: Duration, check_interval: Duration) -> Result<Self, CoreError> {
        if deadline.is_zero() {
            return Err(CoreError::Validation(
                "liveness deadline must be greater than zero".into(),
            ));
        }
        if check_interval.is_zero() {
            return Err(CoreError::Validation(
                "liveness check interval must be greater than zero".into(),
            ));
        }
        Ok(Self {
            deadline,
            check_interval,
        })
    }

    /// Agents last seen before this instant are considered absent.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        let deadline = chrono::Duration::from_std(self.deadline).unwrap_or(chrono::Duration::MAX);
        now.checked_sub_signed(deadline)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC)
    }
}
