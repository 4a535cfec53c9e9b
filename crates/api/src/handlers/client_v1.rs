//! Legacy v1 agent protocol.
//!
//! Deployed agents depend on these exact status codes, so every handler
//! returns [`V1Result`] and bodies are bare JSON without the `data` envelope.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use cipherswarm_core::agent_errors::AgentErrorInput;
use cipherswarm_core::benchmarks::BenchmarkEntry;
use cipherswarm_core::cracks::CrackSubmission;
use cipherswarm_core::error::{CoreError, TaskConflict};
use cipherswarm_core::status::TaskStatus;
use cipherswarm_core::task_details::ProgressUpdate;
use cipherswarm_core::telemetry::{StatusAck, StatusSnapshot};
use cipherswarm_core::types::DbId;
use cipherswarm_coordinator::CoordError;
use cipherswarm_db::models::agent::NewAgent;

use super::{AgentView, HeartbeatRequest, RegistrationView, TaskView};
use crate::error::V1Result;
use crate::middleware::agent_auth::AuthAgent;
use crate::state::AppState;

/// Agents may only address their own record.
fn ensure_self(auth: &AuthAgent, id: DbId) -> V1Result<()> {
    if auth.agent_id != id {
        let message = format!("Agent {} cannot act as agent {id}", auth.agent_id);
        return Err(CoreError::Forbidden(message).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /agents/register
// ---------------------------------------------------------------------------

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewAgent>,
) -> V1Result<impl IntoResponse> {
    let registered = state.coordinator.register(input).await?;
    let view = RegistrationView::try_from(registered)?;
    Ok((StatusCode::CREATED, Json(view)))
}

// ---------------------------------------------------------------------------
// GET /authenticate
// ---------------------------------------------------------------------------

pub async fn authenticate(auth: AuthAgent) -> V1Result<impl IntoResponse> {
    Ok(Json(json!({
        "authenticated": true,
        "agent_id": auth.agent_id,
    })))
}

// ---------------------------------------------------------------------------
// GET /agents/{id}
// ---------------------------------------------------------------------------

pub async fn get_agent(auth: AuthAgent, Path(id): Path<DbId>) -> V1Result<impl IntoResponse> {
    ensure_self(&auth, id)?;
    Ok(Json(AgentView::try_from(auth.agent)?))
}

// ---------------------------------------------------------------------------
// POST /agents/{id}/heartbeat
// ---------------------------------------------------------------------------

/// The body is optional; older agents send none.
pub async fn heartbeat(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<HeartbeatRequest>>,
) -> V1Result<StatusCode> {
    ensure_self(&auth, id)?;
    let reported = body.map(|Json(b)| b).unwrap_or_default().parsed_state()?;
    state.coordinator.heartbeat(id, reported).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /agents/{id}/submit_benchmark
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitBenchmarkRequest {
    pub hashcat_benchmarks: Vec<BenchmarkEntry>,
}

pub async fn submit_benchmark(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitBenchmarkRequest>,
) -> V1Result<StatusCode> {
    ensure_self(&auth, id)?;
    state
        .coordinator
        .submit_benchmarks(id, input.hashcat_benchmarks)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /agents/{id}/submit_error
// ---------------------------------------------------------------------------

pub async fn submit_error(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AgentErrorInput>,
) -> V1Result<StatusCode> {
    ensure_self(&auth, id)?;
    state.coordinator.report_error(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /agents/{id}/shutdown
// ---------------------------------------------------------------------------

pub async fn shutdown(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<StatusCode> {
    ensure_self(&auth, id)?;
    state.coordinator.shutdown(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /tasks/new
// ---------------------------------------------------------------------------

/// 200 with the task, or 204 when nothing is available.
pub async fn new_task(auth: AuthAgent, State(state): State<AppState>) -> V1Result<Response> {
    let assignment = state.coordinator.assign(auth.agent_id).await?;
    match assignment.task() {
        Some(task) => Ok(Json(TaskView::try_from(task.clone())?).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}
// ---------------------------------------------------------------------------

pub async fn get_task(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<impl IntoResponse> {
    let task = state.coordinator.get_task(id, auth.agent_id).await?;
    Ok(Json(TaskView::try_from(task)?))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/accept_task
// ---------------------------------------------------------------------------

/// `/tasks/new` already starts the task, so accepting a task the caller
/// holds and is running answers 204 as well.
pub async fn accept_task(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<StatusCode> {
    match state.coordinator.accept(id, auth.agent_id).await {
        Ok(_) => {}
        Err(err) if is_already_running(&err) => {
            let task = state.coordinator.get_task(id, auth.agent_id).await?;
            if task.status()? != TaskStatus::Running {
                return Err(err.into());
            }
        }
        Err(err) => return Err(err.into()),
    }
    Ok(StatusCode::NO_CONTENT)
}

fn is_already_running(err: &CoordError) -> bool {
    matches!(
        err.as_core(),
        Some(CoreError::TaskConflict {
            conflict: TaskConflict::AlreadyRunning,
            ..
        })
    )
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/exhausted
// ---------------------------------------------------------------------------

pub async fn exhausted(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<StatusCode> {
    state.coordinator.exhaust(id, auth.agent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/abandon
// ---------------------------------------------------------------------------

pub async fn abandon(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<StatusCode> {
    state.coordinator.abandon(id, auth.agent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/progress
// ---------------------------------------------------------------------------

pub async fn progress(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(update): Json<ProgressUpdate>,
) -> V1Result<StatusCode> {
    state
        .coordinator
        .update_progress(id, auth.agent_id, update)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/submit_status
// ---------------------------------------------------------------------------

/// 204 keep going, 202 stale, 410 paused, 422 malformed.
pub async fn submit_status(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(snapshot): Json<StatusSnapshot>,
) -> V1Result<Response> {
    let ack = state
        .coordinator
        .report_status(id, auth.agent_id, snapshot)
        .await?;
    let response = match ack {
        StatusAck::Accepted => StatusCode::NO_CONTENT.into_response(),
        StatusAck::Stale => StatusCode::ACCEPTED.into_response(),
        StatusAck::Paused => StatusCode::GONE.into_response(),
        StatusAck::Rejected { reason } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": reason }))).into_response()
        }
    };
    Ok(response)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/submit_crack
// ---------------------------------------------------------------------------

pub async fn submit_crack(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(submission): Json<CrackSubmission>,
) -> V1Result<impl IntoResponse> {
    state
        .coordinator
        .submit_crack(id, auth.agent_id, submission)
        .await?;
    Ok(Json(json!({ "message": "Cracked hash submitted" })))
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}/get_zaps
// ---------------------------------------------------------------------------

/// Already-cracked `hash:plain` lines as plain text.
pub async fn get_zaps(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> V1Result<impl IntoResponse> {
    let zaps = state.coordinator.task_zaps(id, auth.agent_id).await?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], zaps))
}
