//! Task entity and creation DTO.

use cipherswarm_core::error::CoreError;
use cipherswarm_core::status::{StatusId, TaskStatus};
use cipherswarm_core::task_details::TaskDetails;
use cipherswarm_core::task_lifecycle::TaskSnapshot;
use cipherswarm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub attack_id: DbId,
    pub agent_id: Option<DbId>,
    pub status_id: StatusId,
    pub keyspace_total: i64,
    pub skip: i64,
    pub limit_count: i64,
    pub progress_percent: f64,
    pub keyspace_processed: i64,
    pub details: Option<Json<TaskDetails>>,
    pub retry_count: i32,
    pub retry_of_task_id: Option<DbId>,
    pub assigned_at: Option<Timestamp>,
    pub activity_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn status(&self) -> Result<TaskStatus, CoreError> {
        TaskStatus::from_id(self.status_id)
    }

    /// The fields the lifecycle rules inspect.
    pub fn snapshot(&self) -> Result<TaskSnapshot, CoreError> {
        Ok(TaskSnapshot {
            id: self.id,
            status: self.status()?,
            agent_id: self.agent_id,
            keyspace_total: self.keyspace_total,
        })
    }
}

/// One keyspace slice to enqueue for an attack.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewTask {
    pub keyspace_total: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit_count: i64,
}
