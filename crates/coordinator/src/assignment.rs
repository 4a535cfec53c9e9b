//! Task assignment engine.
//!
//! Preconditions, each a distinct outcome:
//! 1. the agent is enabled and has at least one current benchmark,
//!    otherwise `NoneAvailable`;
//! 2. the agent holds no running task, otherwise `AgentBusy` conflict;
//! 3. the oldest pending, unassigned task with positive keyspace whose
//!    hash mode the agent has benchmarked is claimed.
//!
//! Steps 2 and 3 run inside one transaction holding the agent's row lock,
//! so two concurrent calls for the same agent serialize; the claim itself
//! is a single conditional update with `SKIP LOCKED`, so agents competing
//! for one task never both win.

use cipherswarm_core::error::{CoreError, TaskConflict};
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::task::Task;
use cipherswarm_db::repositories::{AgentRepo, AttackRepo, BenchmarkRepo, TaskRepo};
use cipherswarm_events::Change;
use serde::Serialize;

use crate::error::{agent_not_found, attack_not_found, CoordResult};
use crate::Coordinator;

/// Outcome of an assignment request. `NoneAvailable` is not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "task", rename_all = "snake_case")]
pub enum Assignment {
    Assigned(Task),
    NoneAvailable,
}

impl Assignment {
    pub fn task(&self) -> Option<&Task> {
        match self {
            Assignment::Assigned(task) => Some(task),
            Assignment::NoneAvailable => None,
        }
    }
}

impl Coordinator {
    /// Give the agent at most one pending task it can handle.
    pub async fn assign(&self, agent_id: DbId) -> CoordResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let agent = AgentRepo::lock(&mut *tx, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        if !agent.enabled {
            tracing::debug!(agent_id, "Agent disabled, no assignment");
            return Ok(Assignment::NoneAvailable);
        }

        if !BenchmarkRepo::has_any(&mut *tx, agent_id).await? {
            tracing::debug!(agent_id, "Agent has no benchmarks, no assignment");
            return Ok(Assignment::NoneAvailable);
        }

        if let Some(running) = TaskRepo::find_running(&mut *tx, agent_id).await? {
            tracing::warn!(agent_id, task_id = running.id, "Agent asked for work while running a task");
            return Err(CoreError::task_conflict(running.id, TaskConflict::AgentBusy).into());
        }

        let Some(task) = TaskRepo::claim_next(&mut *tx, agent_id).await? else {
            tx.commit().await?;
            return Ok(Assignment::NoneAvailable);
        };

        let scope = AttackRepo::find_scope(&mut *tx, task.attack_id)
            .await?
            .ok_or_else(|| attack_not_found(task.attack_id))?;
        tx.commit().await?;

        tracing::info!(
            agent_id,
            task_id = task.id,
            attack_id = task.attack_id,
            "Task assigned",
        );
        self.notify(Change::Task {
            task_id: task.id,
            attack_id: scope.attack_id,
            project_id: scope.project_id,
        });
        Ok(Assignment::Assigned(task))
    }
}
