//! v2 agent protocol: canonical status codes and `{ "data": ... }` bodies.
//!
//! The caller is always the agent behind the Bearer token, so agent routes
//! carry no id in the path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use cipherswarm_core::agent_errors::AgentErrorInput;
use cipherswarm_core::benchmarks::BenchmarkEntry;
use cipherswarm_core::cracks::CrackSubmission;
use cipherswarm_core::status::AgentState;
use cipherswarm_core::task_details::{ProgressUpdate, TaskResult};
use cipherswarm_core::telemetry::{StatusAck, StatusSnapshot};
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::agent::NewAgent;
use cipherswarm_db::models::task::Task;

use super::{AgentView, HeartbeatRequest, RegistrationView, StateRequest, TaskView};
use crate::error::AppResult;
use crate::middleware::agent_auth::AuthAgent;
use crate::response::DataResponse;
use crate::state::AppState;

fn task_response(task: Task) -> AppResult<Json<DataResponse<TaskView>>> {
    Ok(Json(DataResponse {
        data: TaskView::try_from(task)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /agents/register
// ---------------------------------------------------------------------------

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewAgent>,
) -> AppResult<impl IntoResponse> {
    let registered = state.coordinator.register(input).await?;
    let data = RegistrationView::try_from(registered)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

// ---------------------------------------------------------------------------
// GET /agents/me
// ---------------------------------------------------------------------------

pub async fn me(auth: AuthAgent) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: AgentView::try_from(auth.agent)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /agents/heartbeat
// ---------------------------------------------------------------------------

pub async fn heartbeat(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<impl IntoResponse> {
    let agent = state
        .coordinator
        .heartbeat(auth.agent_id, input.parsed_state()?)
        .await?;
    Ok(Json(DataResponse {
        data: AgentView::try_from(agent)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /agents/state
// ---------------------------------------------------------------------------

pub async fn update_state(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<StateRequest>,
) -> AppResult<impl IntoResponse> {
    let new_state = AgentState::parse(&input.state)?;
    let agent = state
        .coordinator
        .update_state(auth.agent_id, new_state)
        .await?;
    Ok(Json(DataResponse {
        data: AgentView::try_from(agent)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /agents/benchmarks
// ---------------------------------------------------------------------------

/// Replace the caller's benchmark set.
pub async fn submit_benchmarks(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(entries): Json<Vec<BenchmarkEntry>>,
) -> AppResult<impl IntoResponse> {
    let rows = state
        .coordinator
        .submit_benchmarks(auth.agent_id, entries)
        .await?;
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// GET /agents/benchmarks
// ---------------------------------------------------------------------------

pub async fn benchmark_summary(
    auth: AuthAgent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = state.coordinator.benchmark_summary(auth.agent_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// POST /agents/errors
// ---------------------------------------------------------------------------

pub async fn report_error(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<AgentErrorInput>,
) -> AppResult<impl IntoResponse> {
    let error = state.coordinator.report_error(auth.agent_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: error })))
}

// ---------------------------------------------------------------------------
// POST /agents/shutdown
// ---------------------------------------------------------------------------

pub async fn shutdown(auth: AuthAgent, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let agent = state.coordinator.shutdown(auth.agent_id).await?;
    Ok(Json(DataResponse {
        data: AgentView::try_from(agent)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /tasks/assign
// ---------------------------------------------------------------------------

/// `data` is the assigned task, or `null` when nothing is available.
pub async fn assign(auth: AuthAgent, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let assignment = state.coordinator.assign(auth.agent_id).await?;
    let data = assignment
        .task()
        .cloned()
        .map(TaskView::try_from)
        .transpose()?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}
// ---------------------------------------------------------------------------

pub async fn get_task(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    task_response(state.coordinator.get_task(id, auth.agent_id).await?)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/accept
// ---------------------------------------------------------------------------

pub async fn accept(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    task_response(state.coordinator.accept(id, auth.agent_id).await?)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/exhaust
// ---------------------------------------------------------------------------

pub async fn exhaust(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    task_response(state.coordinator.exhaust(id, auth.agent_id).await?)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/abandon
// ---------------------------------------------------------------------------

pub async fn abandon(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    task_response(state.coordinator.abandon(id, auth.agent_id).await?)
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/result
// ---------------------------------------------------------------------------

pub async fn submit_result(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(result): Json<TaskResult>,
) -> AppResult<impl IntoResponse> {
    task_response(
        state
            .coordinator
            .submit_result(id, auth.agent_id, result)
            .await?,
    )
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/progress
// ---------------------------------------------------------------------------

pub async fn progress(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(update): Json<ProgressUpdate>,
) -> AppResult<impl IntoResponse> {
    task_response(
        state
            .coordinator
            .update_progress(id, auth.agent_id, update)
            .await?,
    )
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/status
// ---------------------------------------------------------------------------

/// Always `{ "data": { "ack": ... } }`; a malformed snapshot answers 422.
pub async fn report_status(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(snapshot): Json<StatusSnapshot>,
) -> AppResult<impl IntoResponse> {
    let ack = state
        .coordinator
        .report_status(id, auth.agent_id, snapshot)
        .await?;
    let status = match ack {
        StatusAck::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    Ok((status, Json(DataResponse { data: ack })))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/cracks
// ---------------------------------------------------------------------------

pub async fn submit_crack(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(submission): Json<CrackSubmission>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .coordinator
        .submit_crack(id, auth.agent_id, submission)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}/zaps
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ZapList {
    pub lines: Vec<String>,
}

/// Already-cracked `hash:plain` pairs for the task's hash list.
pub async fn zaps(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let text = state.coordinator.task_zaps(id, auth.agent_id).await?;
    let lines = text.lines().map(str::to_string).collect();
    Ok(Json(DataResponse {
        data: ZapList { lines },
    }))
}
