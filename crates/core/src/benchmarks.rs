//! Benchmark submission rules and capability summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One measured (hash type, device) throughput from a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    /// Hashcat mode number (e.g. `0` for MD5).
    pub hash_type_id: i32,
    /// Benchmark runtime in milliseconds.
    pub runtime_ms: i64,
    /// Hashes per second.
    pub hash_speed: f64,
    pub device: String,
}

/// Maximum number of entries accepted in one submission.
pub const MAX_BATCH_SIZE: usize = 4096;

/// Validate a benchmark batch before it supersedes the agent's current set.
///
/// Throughput values are not filtered: a row's existence is the only
/// capability signal.
pub fn validate_batch(entries: &[BenchmarkEntry]) -> Result<(), CoreError> {
    if entries.is_empty() {
        return Err(CoreError::Validation(
            "benchmark submission must contain at least one entry".into(),
        ));
    }
    if entries.len() > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "benchmark submission exceeds {MAX_BATCH_SIZE} entries"
        )));
    }
    for entry in entries {
        if entry.hash_type_id < 0 {
            return Err(CoreError::Validation(format!(
                "invalid hash type {}",
                entry.hash_type_id
            )));
        }
        if entry.runtime_ms < 0 {
            return Err(CoreError::Validation(
                "benchmark runtime must not be negative".into(),
            ));
        }
    }
    Ok(())
}

/// Aggregate capability for one hash type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashTypeCapability {
    pub hash_type_id: i32,
    /// Sum of device speeds, hashes per second.
    pub total_speed: f64,
    pub device_count: usize,
}

/// Group benchmark rows by hash type, summing device throughput.
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a BenchmarkEntry>) -> Vec<HashTypeCapability> {
    let mut by_type: BTreeMap<i32, HashTypeCapability> = BTreeMap::new();
    for entry in entries {
        let cap = by_type
            .entry(entry.hash_type_id)
            .or_insert_with(|| HashTypeCapability {
                hash_type_id: entry.hash_type_id,
                total_speed: 0.0,
                device_count: 0,
            });
        cap.total_speed += entry.hash_speed;
        cap.device_count += 1;
    }
    by_type.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry(hash_type_id: i32, speed: f64, device: &str) -> BenchmarkEntry {
        BenchmarkEntry {
            hash_type_id,
            runtime_ms: 1200,
            hash_speed: speed,
            device: device.into(),
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_matches!(validate_batch(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn zero_speed_is_still_a_capability() {
        assert!(validate_batch(&[entry(0, 0.0, "cpu")]).is_ok());
    }

    #[test]
    fn negative_hash_type_is_rejected() {
        assert_matches!(validate_batch(&[entry(-1, 10.0, "gpu")]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn summary_groups_by_hash_type() {
        let rows = [entry(0, 100.0, "gpu0"), entry(0, 50.0, "gpu1"), entry(1000, 7.0, "gpu0")];
        let summary = summarize(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].hash_type_id, 0);
        assert_eq!(summary[0].total_speed, 150.0);
        assert_eq!(summary[0].device_count, 2);
        assert_eq!(summary[1].hash_type_id, 1000);
    }
}
