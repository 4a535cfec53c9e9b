//! Read-only views of the attack hierarchy.

use cipherswarm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attacks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attack {
    pub id: DbId,
    pub campaign_id: DbId,
    pub name: String,
    pub hash_mode: i32,
    pub created_at: Timestamp,
}

/// An attack together with the campaign-level ids the coordinator needs.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct AttackScope {
    pub attack_id: DbId,
    pub project_id: DbId,
    pub hash_list_id: DbId,
    pub hash_mode: i32,
}
