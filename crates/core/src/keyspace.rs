//! Keyspace decomposition into task ranges.

use serde::Serialize;

use crate::error::CoreError;

/// Maximum number of tasks one attack may be split into.
pub const MAX_CHUNKS: u32 = 10_000;

/// A contiguous `[skip, skip + limit)` slice of an attack's keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyspaceRange {
    pub skip: i64,
    pub limit: i64,
}

/// Split `total` into `chunks` contiguous ranges of near-equal size.
///
/// Earlier ranges take the remainder, so sizes differ by at most one.
pub fn split_keyspace(total: i64, chunks: u32) -> Result<Vec<KeyspaceRange>, CoreError> {
    if total <= 0 {
        return Err(CoreError::Validation(format!(
            "keyspace must be positive, got {total}"
        )));
    }
    if chunks == 0 || chunks > MAX_CHUNKS {
        return Err(CoreError::Validation(format!(
            "chunk count must be between 1 and {MAX_CHUNKS}"
        )));
    }

    let chunks = i64::from(chunks).min(total);
    let base = total / chunks;
    let remainder = total % chunks;

    let mut ranges = Vec::with_capacity(chunks as usize);
    let mut skip = 0;
    for i in 0..chunks {
        let limit = base + i64::from(i < remainder);
        ranges.push(KeyspaceRange { skip, limit });
        skip += limit;
    }
    Ok(ranges)
}
