//! SHA-256 hex digests.
//!
//! Agent tokens are stored only as their digest, and the admin token is
//! compared digest to digest.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
