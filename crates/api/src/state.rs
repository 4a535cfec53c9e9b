use std::sync::Arc;

use cipherswarm_coordinator::Coordinator;
use cipherswarm_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used directly only by the health check.
    pub pool: cipherswarm_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// The coordinator every client and admin handler delegates to.
    pub coordinator: Arc<Coordinator>,
    /// Receives a `PlatformEvent` after every committed mutation.
    pub event_bus: Arc<EventBus>,
}
