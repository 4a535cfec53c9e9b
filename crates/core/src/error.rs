use crate::types::DbId;

/// Domain error taxonomy shared by every coordinator operation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The submitted hash does not belong to the task's target hash list.
    #[error("Hash not found in hash list {hash_list_id}")]
    HashNotInTargetSet { hash_list_id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The task's current state does not permit the requested transition.
    #[error("Task {task_id}: {conflict}")]
    TaskConflict {
        task_id: DbId,
        conflict: TaskConflict,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a task refused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskConflict {
    #[error("task already completed")]
    AlreadyCompleted,
    #[error("task already abandoned")]
    AlreadyAbandoned,
    #[error("task already failed")]
    AlreadyFailed,
    #[error("task already running")]
    AlreadyRunning,
    #[error("task is not running")]
    NotRunning,
    #[error("task is not paused")]
    NotPaused,
    #[error("agent already has a running task")]
    AgentBusy,
}

impl CoreError {
    /// Shorthand for a task-state conflict.
    pub fn task_conflict(task_id: DbId, conflict: TaskConflict) -> Self {
        CoreError::TaskConflict { task_id, conflict }
    }

    /// The caller is a valid agent but does not hold the task.
    pub fn not_assigned(task_id: DbId) -> Self {
        CoreError::Forbidden(format!("agent is not assigned to task {task_id}"))
    }
}
