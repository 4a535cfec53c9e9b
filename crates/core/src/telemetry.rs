//! Status telemetry validation, progress derivation and acknowledgement.

use chrono::{DurationRound, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::TaskStatus;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// A periodic status report from the agent holding a task.
///
/// `hashcat_guess` and `device_statuses` are optional on the wire so their
/// absence reaches [`StatusSnapshot::validate`] instead of failing
/// deserialization with an opaque message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub original_line: String,
    pub time: Timestamp,
    pub session: String,
    pub status: i32,
    pub target: String,
    /// `[processed, total]` keyspace positions.
    pub progress: [i64; 2],
    pub restore_point: i64,
    /// `[recovered, total]` hashes.
    pub recovered_hashes: [i64; 2],
    /// `[recovered, total]` salts.
    pub recovered_salts: [i64; 2],
    pub rejected: i64,
    pub time_start: Timestamp,
    pub estimated_stop: Timestamp,
    #[serde(default, alias = "guess")]
    pub hashcat_guess: Option<GuessSnapshot>,
    #[serde(default, alias = "devices")]
    pub device_statuses: Option<Vec<DeviceSnapshot>>,
}

/// Guess composition at the time of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessSnapshot {
    pub guess_base: String,
    pub guess_base_count: i64,
    pub guess_base_offset: i64,
    pub guess_base_percentage: f64,
    pub guess_mod: Option<String>,
    pub guess_mod_count: i64,
    pub guess_mod_offset: i64,
    pub guess_mod_percentage: f64,
    pub guess_mode: i32,
}

/// One compute device's state at the time of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_id: i32,
    pub device_name: String,
    pub device_type: String,
    /// Hashes per second.
    pub speed: i64,
    pub utilization: i32,
    /// Degrees Celsius, `-1` when the device does not report it.
    pub temperature: i32,
}

/// A snapshot that passed validation; guess and devices are guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSnapshot {
    pub snapshot: StatusSnapshot,
    pub guess: GuessSnapshot,
    pub devices: Vec<DeviceSnapshot>,
}

impl StatusSnapshot {
    /// Check structural completeness and split out the required parts.
    pub fn validate(mut self) -> Result<ValidatedSnapshot, CoreError> {
        let guess = self
            .hashcat_guess
            .take()
            .ok_or_else(|| CoreError::Validation("Guess not found".into()))?;

        let devices = self
            .device_statuses
            .take()
            .filter(|devices| !devices.is_empty())
            .ok_or_else(|| CoreError::Validation("Device Statuses not found".into()))?;

        let [processed, total] = self.progress;
        if processed < 0 || total < 0 {
            return Err(CoreError::Validation(
                "progress values must not be negative".into(),
            ));
        }

        for device in &devices {
            if device.device_name.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "device {} has no name",
                    device.device_id
                )));
            }
            if device.speed < 0 {
                return Err(CoreError::Validation(format!(
                    "device '{}' reported a negative speed",
                    device.device_name
                )));
            }
        }

        Ok(ValidatedSnapshot {
            snapshot: self,
            guess,
            devices,
        })
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Percent of the keyspace processed, clamped to `0..=100`.
pub fn progress_percent(progress: [i64; 2]) -> f64 {
    let [processed, total] = progress;
    if total <= 0 {
        return 0.0;
    }
    (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Start of the performance bucket containing `at`. A width chrono cannot
/// represent leaves `at` untruncated.
pub fn bucket_start(at: Timestamp, bucket_secs: i64) -> Timestamp {
    TimeDelta::try_seconds(bucket_secs.max(1))
        .and_then(|width| at.duration_trunc(width).ok())
        .unwrap_or(at)
}

// ---------------------------------------------------------------------------
// Acknowledgement
// ---------------------------------------------------------------------------

/// What the agent should make of its status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "ack", rename_all = "snake_case")]
pub enum StatusAck {
    /// Task is running and incomplete; keep going.
    Accepted,
    /// Task finished by another path; the report was not applied.
    Stale,
    /// Task was paused; stop work and expect nothing further.
    Paused,
    /// The report was structurally malformed.
    Rejected { reason: String },
}

/// Derive the acknowledgement from the task state read after the write.
pub fn derive_ack(status_after: TaskStatus, progress_percent: f64) -> StatusAck {
    match status_after {
        TaskStatus::Paused => StatusAck::Paused,
        TaskStatus::Running if progress_percent < 100.0 => StatusAck::Accepted,
        _ => StatusAck::Stale,
    }
}
