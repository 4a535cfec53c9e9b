//! Route definitions for the v2 agent protocol.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::client_v2;
use crate::state::AppState;

/// Routes mounted at `/api/v2/client`.
///
/// ```text
/// POST /agents/register      -> register
/// GET  /agents/me            -> me
/// POST /agents/heartbeat     -> heartbeat
/// POST /agents/state         -> update_state
/// POST /agents/benchmarks    -> submit_benchmarks
/// GET  /agents/benchmarks    -> benchmark_summary
/// POST /agents/errors        -> report_error
/// POST /agents/shutdown      -> shutdown
/// POST /tasks/assign         -> assign
/// GET  /tasks/{id}           -> get_task
/// POST /tasks/{id}/accept    -> accept
/// POST /tasks/{id}/exhaust   -> exhaust
/// POST /tasks/{id}/abandon   -> abandon
/// POST /tasks/{id}/result    -> submit_result
/// POST /tasks/{id}/progress  -> progress
/// POST /tasks/{id}/status    -> report_status
/// POST /tasks/{id}/cracks    -> submit_crack
/// GET  /tasks/{id}/zaps      -> zaps
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents/register", post(client_v2::register))
        .route("/agents/me", get(client_v2::me))
        .route("/agents/heartbeat", post(client_v2::heartbeat))
        .route("/agents/state", post(client_v2::update_state))
        .route(
            "/agents/benchmarks",
            get(client_v2::benchmark_summary).post(client_v2::submit_benchmarks),
        )
        .route("/agents/errors", post(client_v2::report_error))
        .route("/agents/shutdown", post(client_v2::shutdown))
        .route("/tasks/assign", post(client_v2::assign))
        .route("/tasks/{id}", get(client_v2::get_task))
        .route("/tasks/{id}/accept", post(client_v2::accept))
        .route("/tasks/{id}/exhaust", post(client_v2::exhaust))
        .route("/tasks/{id}/abandon", post(client_v2::abandon))
        .route("/tasks/{id}/result", post(client_v2::submit_result))
        .route("/tasks/{id}/progress", post(client_v2::progress))
        .route("/tasks/{id}/status", post(client_v2::report_status))
        .route("/tasks/{id}/cracks", post(client_v2::submit_crack))
        .route("/tasks/{id}/zaps", get(client_v2::zaps))
}
