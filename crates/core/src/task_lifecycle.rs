//! Task lifecycle transition rules.
//!
//! ```text
//! PENDING --assign/accept--> RUNNING --exhaust/succeed--> COMPLETED
//!                            RUNNING --fail-----------> FAILED
//!                            RUNNING --abandon--------> ABANDONED
//!                            RUNNING <--pause/resume--> PAUSED --abandon--> ABANDONED
//! ```
//!
//! The repository layer re-reads the task under a row lock and runs these
//! checks on every mutating call; nothing here trusts an earlier read.

use crate::error::{CoreError, TaskConflict};
use crate::status::TaskStatus;
use crate::types::DbId;

/// The fields of a task the transition rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: DbId,
    pub status: TaskStatus,
    pub agent_id: Option<DbId>,
    pub keyspace_total: i64,
}

/// A requested state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Agent takes a pre-offered pending task.
    Accept,
    /// Agent finished the keyspace without further results.
    Exhaust,
    /// Agent gives the task up.
    Abandon,
    /// Agent submitted a result without error.
    Succeed,
    /// Agent submitted a result carrying an error.
    Fail,
    /// Administrator pauses a running task.
    Pause,
    /// Administrator resumes a paused task.
    Resume,
}

impl Transition {
    /// The status the task ends up in.
    pub fn target(self) -> TaskStatus {
        match self {
            Transition::Accept | Transition::Resume => TaskStatus::Running,
            Transition::Exhaust | Transition::Succeed => TaskStatus::Completed,
            Transition::Abandon => TaskStatus::Abandoned,
            Transition::Fail => TaskStatus::Failed,
            Transition::Pause => TaskStatus::Paused,
        }
    }

    fn allowed_from(self) -> &'static [TaskStatus] {
        match self {
            Transition::Accept => &[TaskStatus::Pending],
            Transition::Exhaust | Transition::Succeed | Transition::Fail | Transition::Pause => {
                &[TaskStatus::Running]
            }
            Transition::Abandon => &[TaskStatus::Running, TaskStatus::Paused],
            Transition::Resume => &[TaskStatus::Paused],
        }
    }

    /// Administrative transitions are not bound to the holding agent.
    fn is_administrative(self) -> bool {
        matches!(self, Transition::Pause | Transition::Resume)
    }
}

/// The conflict reported for a task sitting in a terminal state.
pub fn terminal_conflict(status: TaskStatus) -> Option<TaskConflict> {
    match status {
        TaskStatus::Completed => Some(TaskConflict::AlreadyCompleted),
        TaskStatus::Failed => Some(TaskConflict::AlreadyFailed),
        TaskStatus::Abandoned => Some(TaskConflict::AlreadyAbandoned),
        TaskStatus::Pending | TaskStatus::Running | TaskStatus::Paused => None,
    }
}

/// Verify that `agent_id` is the agent holding `task`.
pub fn check_ownership(task: &TaskSnapshot, agent_id: DbId) -> Result<(), CoreError> {
    if task.agent_id == Some(agent_id) {
        Ok(())
    } else {
        Err(CoreError::not_assigned(task.id))
    }
}

/// Decide whether `transition` may be applied to `task` on behalf of
/// `agent_id` (`None` for administrative callers).
///
/// Returns the target status on success. Ownership is checked before state
/// so a foreign agent never learns anything about the task's progress.
pub fn check_transition(
    task: &TaskSnapshot,
    transition: Transition,
    agent_id: Option<DbId>,
) -> Result<TaskStatus, CoreError> {
    if !transition.is_administrative() {
        let caller = agent_id.ok_or_else(|| CoreError::not_assigned(task.id))?;
        match (transition, task.agent_id) {
            // A pending task is unassigned; anyone capable may accept it.
            (Transition::Accept, None) => {}
            _ => check_ownership(task, caller)?,
        }
    }

    if transition.allowed_from().contains(&task.status) {
        if transition == Transition::Accept && task.keyspace_total <= 0 {
            return Err(CoreError::Validation(format!(
                "task {} has a non-positive keyspace",
                task.id
            )));
        }
        return Ok(transition.target());
    }

    let conflict = terminal_conflict(task.status).unwrap_or(match (transition, task.status) {
        (Transition::Accept, _) => TaskConflict::AlreadyRunning,
        (Transition::Resume, TaskStatus::Running) => TaskConflict::AlreadyRunning,
        (Transition::Resume, _) => TaskConflict::NotPaused,
        _ => TaskConflict::NotRunning,
    });
    Err(CoreError::task_conflict(task.id, conflict))
}

/// Non-transition mutations (progress, cracks) need a running task held by
/// the caller.
pub fn check_running_holder(task: &TaskSnapshot, agent_id: DbId) -> Result<(), CoreError> {
    check_ownership(task, agent_id)?;
    match task.status {
        TaskStatus::Running => Ok(()),
        status => Err(CoreError::task_conflict(
            task.id,
            terminal_conflict(status).unwrap_or(TaskConflict::NotRunning),
        )),
    }
}
