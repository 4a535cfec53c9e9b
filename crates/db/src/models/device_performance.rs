use cipherswarm_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// One bucket of the rolling per-device throughput series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DevicePerformancePoint {
    pub device_name: String,
    pub bucket_start: Timestamp,
    pub sample_count: i32,
    /// Mean of the reported speeds in this bucket, hashes per second.
    pub avg_speed: f64,
    pub max_speed: i64,
}
