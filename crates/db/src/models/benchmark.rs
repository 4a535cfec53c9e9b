use cipherswarm_core::benchmarks::BenchmarkEntry;
use cipherswarm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `benchmarks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Benchmark {
    pub id: DbId,
    pub agent_id: DbId,
    pub hash_type_id: i32,
    pub runtime_ms: i64,
    pub hash_speed: f64,
    pub device: String,
    pub created_at: Timestamp,
    pub retired_at: Option<Timestamp>,
}

impl Benchmark {
    pub fn entry(&self) -> BenchmarkEntry {
        BenchmarkEntry {
            hash_type_id: self.hash_type_id,
            runtime_ms: self.runtime_ms,
            hash_speed: self.hash_speed,
            device: self.device.clone(),
        }
    }
}
