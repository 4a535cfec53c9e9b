//! Route definitions for the legacy v1 agent protocol.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::client_v1;
use crate::state::AppState;

/// Routes mounted at `/api/v1/client`.
///
/// Everything except registration requires an agent Bearer token.
///
/// ```text
/// POST /agents/register               -> register
/// GET  /authenticate                  -> authenticate
/// GET  /agents/{id}                   -> get_agent
/// POST /agents/{id}/heartbeat         -> heartbeat
/// POST /agents/{id}/submit_benchmark  -> submit_benchmark
/// POST /agents/{id}/submit_error      -> submit_error
/// POST /agents/{id}/shutdown          -> shutdown
/// GET  /tasks/new                     -> new_task
/// GET  /tasks/{id}                    -> get_task
/// POST /tasks/{id}/accept_task        -> accept_task
/// POST /tasks/{id}/exhausted          -> exhausted
/// POST /tasks/{id}/abandon            -> abandon
/// POST /tasks/{id}/progress           -> progress
/// POST /tasks/{id}/submit_status      -> submit_status
/// POST /tasks/{id}/submit_crack       -> submit_crack
/// GET  /tasks/{id}/get_zaps           -> get_zaps
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents/register", post(client_v1::register))
        .route("/authenticate", get(client_v1::authenticate))
        .route("/agents/{id}", get(client_v1::get_agent))
        .route("/agents/{id}/heartbeat", post(client_v1::heartbeat))
        .route("/agents/{id}/submit_benchmark", post(client_v1::submit_benchmark))
        .route("/agents/{id}/submit_error", post(client_v1::submit_error))
        .route("/agents/{id}/shutdown", post(client_v1::shutdown))
        .route("/tasks/new", get(client_v1::new_task))
        .route("/tasks/{id}", get(client_v1::get_task))
        .route("/tasks/{id}/accept_task", post(client_v1::accept_task))
        .route("/tasks/{id}/exhausted", post(client_v1::exhausted))
        .route("/tasks/{id}/abandon", post(client_v1::abandon))
        .route("/tasks/{id}/progress", post(client_v1::progress))
        .route("/tasks/{id}/submit_status", post(client_v1::submit_status))
        .route("/tasks/{id}/submit_crack", post(client_v1::submit_crack))
        .route("/tasks/{id}/get_zaps", get(client_v1::get_zaps))
}
