//! Append-only status telemetry rows.

use cipherswarm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `task_status_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusUpdate {
    pub id: DbId,
    pub task_id: DbId,
    pub agent_id: DbId,
    pub original_line: String,
    pub reported_at: Timestamp,
    pub session: String,
    pub status: i32,
    pub target: String,
    pub progress_processed: i64,
    pub progress_total: i64,
    pub restore_point: i64,
    pub recovered_hashes: i64,
    pub recovered_hashes_total: i64,
    pub recovered_salts: i64,
    pub recovered_salts_total: i64,
    pub rejected: i64,
    pub time_start: Timestamp,
    pub estimated_stop: Timestamp,
    pub created_at: Timestamp,
}

/// A row from the `task_device_statuses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceStatus {
    pub id: DbId,
    pub status_update_id: DbId,
    pub device_id: i32,
    pub device_name: String,
    pub device_type: String,
    pub speed: i64,
    pub utilization: i32,
    pub temperature: i32,
}
