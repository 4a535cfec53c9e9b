//! Route definitions for operator endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/api/v1/admin`.
///
/// All routes require `ADMIN_API_TOKEN` (enforced by handler extractors).
///
/// ```text
/// PUT  /agents/{id}/enabled        -> set_agent_enabled
/// POST /agents/{id}/benchmark      -> request_benchmark
/// GET  /agents/{id}/benchmarks     -> benchmark_summary
/// GET  /agents/{id}/errors         -> list_agent_errors
/// GET  /agents/{id}/performance    -> device_performance
/// POST /tasks/{id}/pause           -> pause_task
/// POST /tasks/{id}/resume          -> resume_task
/// GET  /tasks/{id}/status_history  -> status_history
/// GET  /status_updates/{id}/devices -> status_devices
/// GET  /attacks/{id}/tasks         -> list_attack_tasks
/// POST /attacks/{id}/tasks         -> enqueue_tasks
/// GET  /attacks/{id}/cracks        -> crack_count
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents/{id}/enabled", put(admin::set_agent_enabled))
        .route("/agents/{id}/benchmark", post(admin::request_benchmark))
        .route("/agents/{id}/benchmarks", get(admin::benchmark_summary))
        .route("/agents/{id}/errors", get(admin::list_agent_errors))
        .route("/agents/{id}/performance", get(admin::device_performance))
        .route("/tasks/{id}/pause", post(admin::pause_task))
        .route("/tasks/{id}/resume", post(admin::resume_task))
        .route("/tasks/{id}/status_history", get(admin::status_history))
        .route("/status_updates/{id}/devices", get(admin::status_devices))
        .route(
            "/attacks/{id}/tasks",
            get(admin::list_attack_tasks).post(admin::enqueue_tasks),
        )
        .route("/attacks/{id}/cracks", get(admin::crack_count))
}
