//! The task assignment and agent/task lifecycle coordinator.
//!
//! [`Coordinator`] is stateless apart from its pool and notifier: every
//! operation opens its own transaction, re-reads the rows it depends on
//! under lock, applies the rules from `cipherswarm_core`, commits, and only
//! then notifies.

use std::sync::Arc;

use cipherswarm_db::DbPool;
use cipherswarm_events::{Change, ChangeNotifier};

pub mod assignment;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod liveness;
pub mod registry;
pub mod results;
pub mod telemetry;

pub use assignment::Assignment;
pub use config::CoordinatorConfig;
pub use error::{CoordError, CoordResult};

/// Shared coordinator service. Cheap to clone.
#[derive(Clone)]
pub struct Coordinator {
    pool: DbPool,
    notifier: Arc<dyn ChangeNotifier>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(pool: DbPool, notifier: Arc<dyn ChangeNotifier>, config: CoordinatorConfig) -> Self {
        Self {
            pool,
            notifier,
            config,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Fire-and-forget; called only after commit.
    fn notify(&self, change: Change) {
        self.notifier.notify_changed(change);
    }
}
