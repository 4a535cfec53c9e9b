use cipherswarm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `hash_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HashItem {
    pub id: DbId,
    pub hash: String,
    pub salt: Option<String>,
    pub plain_text: Option<String>,
    pub cracked_at: Option<Timestamp>,
}

/// An already-solved hash in a list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CrackedPair {
    pub hash: String,
    pub plain_text: String,
}
