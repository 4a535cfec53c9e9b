use cipherswarm_core::error::CoreError;
use cipherswarm_core::types::DbId;

/// Failure of a coordinator operation.
///
/// Every anticipated condition is a [`CoreError`]; only storage faults
/// surface as [`CoordError::Database`].
#[derive(Debug, thiserror::Error)]
pub enum CoordError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for coordinator return values.
pub type CoordResult<T> = Result<T, CoordError>;

impl CoordError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            CoordError::Core(core) => Some(core),
            CoordError::Database(_) => None,
        }
    }
}

pub(crate) fn agent_not_found(id: DbId) -> CoordError {
    CoreError::NotFound { entity: "Agent", id }.into()
}

pub(crate) fn task_not_found(id: DbId) -> CoordError {
    CoreError::NotFound { entity: "Task", id }.into()
}

pub(crate) fn attack_not_found(id: DbId) -> CoordError {
    CoreError::NotFound {
        entity: "Attack",
        id,
    }
    .into()
}
