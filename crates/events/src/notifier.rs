//! The outward "something changed" hook.

use cipherswarm_core::types::DbId;

use crate::bus::{EventBus, PlatformEvent};

/// What changed, with the scope downstream fan-out needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A task of this attack changed state or progress.
    Task {
        task_id: DbId,
        attack_id: DbId,
        project_id: DbId,
    },
    /// A new plaintext was recovered for this attack.
    Crack {
        attack_id: DbId,
        project_id: DbId,
        hash_item_id: DbId,
    },
    /// Agent registry data changed.
    Agent { agent_id: DbId },
}

/// Receives a notification after each committed mutation.
///
/// Implementations must not block and must not fail: the mutation is
/// already committed when this is called.
pub trait ChangeNotifier: Send + Sync {
    fn notify_changed(&self, change: Change);
}

impl Change {
    /// Render as a bus event.
    pub fn to_event(self) -> PlatformEvent {
        match self {
            Change::Task {
                task_id,
                attack_id,
                project_id,
            } => PlatformEvent::new("task.changed")
                .with_source("attack", attack_id)
                .with_project(project_id)
                .with_payload(serde_json::json!({ "task_id": task_id })),
            Change::Crack {
                attack_id,
                project_id,
                hash_item_id,
            } => PlatformEvent::new("crack.recorded")
                .with_source("attack", attack_id)
                .with_project(project_id)
                .with_payload(serde_json::json!({ "hash_item_id": hash_item_id })),
            Change::Agent { agent_id } => {
                PlatformEvent::new("agent.changed").with_source("agent", agent_id)
            }
        }
    }
}

impl ChangeNotifier for EventBus {
    fn notify_changed(&self, change: Change) {
        tracing::trace!(?change, "Publishing change notification");
        self.publish(change.to_event());
    }
}
