//! Reaping of tasks held by agents that went silent.

use cipherswarm_core::status::TaskStatus;
use cipherswarm_core::task_details::TaskDetails;
use cipherswarm_core::types::{DbId, Timestamp};
use cipherswarm_db::models::attack::AttackScope;
use cipherswarm_db::models::task::Task;
use cipherswarm_db::repositories::TaskRepo;
use serde::Serialize;

use crate::error::CoordResult;
use crate::lifecycle::scope_of;
use crate::Coordinator;

const MISSED_DEADLINE_MESSAGE: &str = "agent missed liveness deadline";

/// A running task taken back from a silent agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReapedTask {
    pub abandoned_task_id: DbId,
    pub replacement_task_id: DbId,
    pub agent_id: Option<DbId>,
}

impl Coordinator {
    /// Abandon every running task whose agent was last seen before `cutoff`
    /// and enqueue a pending replacement covering the same keyspace.
    ///
    /// Rows another transaction holds are skipped and picked up next pass.
    pub async fn reap_silent_agents(&self, cutoff: Timestamp) -> CoordResult<Vec<ReapedTask>> {
        let mut tx = self.pool.begin().await?;
        let stale = TaskRepo::lock_stale_running(&mut *tx, cutoff).await?;
        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let details = TaskDetails::Error {
            message: MISSED_DEADLINE_MESSAGE.into(),
            exit_code: None,
        };

        let mut reaped = Vec::with_capacity(stale.len());
        let mut changed: Vec<(Task, AttackScope)> = Vec::with_capacity(stale.len() * 2);
        for task in stale {
            let Some(abandoned) = TaskRepo::transition(
                &mut *tx,
                task.id,
                TaskStatus::Running,
                TaskStatus::Abandoned,
                Some(&details),
            )
            .await?
            else {
                continue;
            };
            let replacement = TaskRepo::requeue(&mut *tx, &abandoned).await?;
            let scope = scope_of(&mut *tx, &abandoned).await?;

            reaped.push(ReapedTask {
                abandoned_task_id: abandoned.id,
                replacement_task_id: replacement.id,
                agent_id: abandoned.agent_id,
            });
            changed.push((abandoned, scope));
            changed.push((replacement, scope));
        }
        tx.commit().await?;

        for reap in &reaped {
            tracing::warn!(
                task_id = reap.abandoned_task_id,
                replacement_task_id = reap.replacement_task_id,
                agent_id = ?reap.agent_id,
                "Abandoned task of silent agent"
            );
        }
        for (task, scope) in &changed {
            self.notify_task(task, scope);
        }
        Ok(reaped)
    }
}
