//! Operator endpoints. Every handler requires [`RequireAdmin`].

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use cipherswarm_core::types::DbId;

use super::{AgentView, TaskView};
use crate::error::AppResult;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of rows for list endpoints.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Upper bound on any list endpoint's `limit`.
const MAX_LIST_LIMIT: i64 = 500;

/// Default device performance window: one day.
const DEFAULT_PERFORMANCE_WINDOW_SECS: u64 = 86_400;

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    fn clamped(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

// ---------------------------------------------------------------------------
// PUT /agents/{id}/enabled
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

pub async fn set_agent_enabled(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetEnabledRequest>,
) -> AppResult<impl IntoResponse> {
    let agent = state.coordinator.set_enabled(id, input.enabled).await?;
    Ok(Json(DataResponse {
        data: AgentView::try_from(agent)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /agents/{id}/benchmark
// ---------------------------------------------------------------------------

/// Retire the agent's benchmarks so it re-benchmarks before more work.
pub async fn request_benchmark(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let agent = state.coordinator.request_benchmark(id).await?;
    Ok(Json(DataResponse {
        data: AgentView::try_from(agent)?,
    }))
}

// ---------------------------------------------------------------------------
// GET /agents/{id}/benchmarks
// ---------------------------------------------------------------------------

pub async fn benchmark_summary(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let summary = state.coordinator.benchmark_summary(id).await?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// GET /agents/{id}/errors
// ---------------------------------------------------------------------------

pub async fn list_agent_errors(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let errors = state.coordinator.list_errors(id, params.clamped()).await?;
    Ok(Json(DataResponse { data: errors }))
}

// ---------------------------------------------------------------------------
// GET /agents/{id}/performance
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PerformanceParams {
    pub window_secs: Option<u64>,
}

/// Per-device throughput buckets within the requested window.
pub async fn device_performance(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PerformanceParams>,
) -> AppResult<impl IntoResponse> {
    let window = Duration::from_secs(
        params
            .window_secs
            .unwrap_or(DEFAULT_PERFORMANCE_WINDOW_SECS),
    );
    let series = state.coordinator.device_performance(id, window).await?;
    Ok(Json(DataResponse { data: series }))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/pause
// ---------------------------------------------------------------------------

pub async fn pause_task(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = state.coordinator.pause_task(id).await?;
    tracing::info!(task_id = id, "Task paused by operator");
    Ok(Json(DataResponse {
        data: TaskView::try_from(task)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/resume
// ---------------------------------------------------------------------------

pub async fn resume_task(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = state.coordinator.resume_task(id).await?;
    tracing::info!(task_id = id, "Task resumed by operator");
    Ok(Json(DataResponse {
        data: TaskView::try_from(task)?,
    }))
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}/status_history
// ---------------------------------------------------------------------------

pub async fn status_history(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let history = state
        .coordinator
        .status_history(id, Some(params.clamped()))
        .await?;
    Ok(Json(DataResponse { data: history }))
}

// ---------------------------------------------------------------------------
// GET /status_updates/{id}/devices
// ---------------------------------------------------------------------------

pub async fn status_devices(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let devices = state.coordinator.status_devices(id).await?;
    Ok(Json(DataResponse { data: devices }))
}

// ---------------------------------------------------------------------------
// POST /attacks/{id}/tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EnqueueTasksRequest {
    pub keyspace_total: i64,
    pub chunks: u32,
}

/// Split the attack's keyspace into pending tasks.
pub async fn enqueue_tasks(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(attack_id): Path<DbId>,
    Json(input): Json<EnqueueTasksRequest>,
) -> AppResult<impl IntoResponse> {
    let created = state
        .coordinator
        .enqueue_tasks(attack_id, input.keyspace_total, input.chunks)
        .await?;
    let data = created
        .into_iter()
        .map(TaskView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

// ---------------------------------------------------------------------------
// GET /attacks/{id}/tasks
// ---------------------------------------------------------------------------

pub async fn list_attack_tasks(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(attack_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tasks = state.coordinator.list_attack_tasks(attack_id).await?;
    let data = tasks
        .into_iter()
        .map(TaskView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /attacks/{id}/cracks
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CrackCount {
    pub attack_id: DbId,
    pub cracked: i64,
}

pub async fn crack_count(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(attack_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cracked = state.coordinator.crack_count(attack_id).await?;
    Ok(Json(DataResponse {
        data: CrackCount { attack_id, cracked },
    }))
}
