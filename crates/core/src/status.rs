//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table (`agent_states`, `task_statuses`,
//! `error_severities`). The string form is what crosses the wire.

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in discriminant order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
                match id {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Internal(format!(
                        "unknown {} id {other}",
                        stringify!($name)
                    ))),
                }
            }

            /// Lowercase wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a wire name, rejecting anything outside the declared set.
            pub fn parse(value: &str) -> Result<Self, CoreError> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $( $label => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "'{other}' is not a valid {}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Agent lifecycle state.
    AgentState {
        Pending = 1 => "pending",
        Active = 2 => "active",
        Stopped = 3 => "stopped",
        Error = 4 => "error",
    }
}

define_status_enum! {
    /// Task lifecycle status.
    TaskStatus {
        Pending = 1 => "pending",
        Running = 2 => "running",
        Paused = 3 => "paused",
        Completed = 4 => "completed",
        Failed = 5 => "failed",
        Abandoned = 6 => "abandoned",
    }
}

define_status_enum! {
    /// Severity of an agent-reported error, ordered from least to most severe.
    ErrorSeverity {
        Info = 1 => "info",
        Warning = 2 => "warning",
        Minor = 3 => "minor",
        Major = 4 => "major",
        Critical = 5 => "critical",
        Fatal = 6 => "fatal",
    }
}

impl TaskStatus {
    /// Completed, failed and abandoned tasks accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Abandoned
        )
    }
}

impl ErrorSeverity {
    /// Major and above force the reporting agent into the error state.
    pub fn forces_error_state(self) -> bool {
        self >= ErrorSeverity::Major
    }
}
