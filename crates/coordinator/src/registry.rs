//! Worker registry, benchmark store and capability matcher operations.

use std::time::Duration;

use chrono::Utc;
use cipherswarm_core::agent_errors::AgentErrorInput;
use cipherswarm_core::agent_token;
use cipherswarm_core::benchmarks::{self, BenchmarkEntry, HashTypeCapability};
use cipherswarm_core::error::CoreError;
use cipherswarm_core::registry::validate_identity_field;
use cipherswarm_core::status::AgentState;
use cipherswarm_core::task_lifecycle;
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::agent::{Agent, NewAgent, RegisteredAgent};
use cipherswarm_db::models::agent_error::AgentError;
use cipherswarm_db::models::benchmark::Benchmark;
use cipherswarm_db::models::device_performance::DevicePerformancePoint;
use cipherswarm_db::repositories::{
    AgentErrorRepo, AgentRepo, BenchmarkRepo, DevicePerformanceRepo, TaskRepo,
};
use cipherswarm_events::Change;

use crate::error::{agent_not_found, task_not_found, CoordResult};
use crate::Coordinator;

impl Coordinator {
    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Create a new pending agent and mint its capability token.
    ///
    /// Re-registering the same host creates a new agent; tokens are never
    /// reissued.
    pub async fn register(&self, input: NewAgent) -> CoordResult<RegisteredAgent> {
        validate_identity_field("host_name", &input.host_name)?;
        validate_identity_field("client_signature", &input.client_signature)?;
        validate_identity_field("operating_system", &input.operating_system)?;

        let registered = AgentRepo::register(&self.pool, &input).await?;

        tracing::info!(
            agent_id = registered.agent.id,
            host_name = %registered.agent.host_name,
            "Agent registered",
        );
        self.notify(Change::Agent {
            agent_id: registered.agent.id,
        });
        Ok(registered)
    }

    /// Resolve a bearer token to its agent.
    pub async fn authenticate(&self, token: &str) -> CoordResult<Agent> {
        let embedded_id = agent_token::embedded_agent_id(token)
            .ok_or_else(|| CoreError::Unauthorized("Malformed agent token".into()))?;

        let agent = AgentRepo::find_by_token_hash(&self.pool, &agent_token::hash_token(token))
            .await?
            .filter(|agent| agent.id == embedded_id)
            .ok_or_else(|| CoreError::Unauthorized("Invalid agent token".into()))?;

        Ok(agent)
    }

    pub async fn get_agent(&self, agent_id: DbId) -> CoordResult<Agent> {
        AgentRepo::find_by_id(&self.pool, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))
    }

    // -----------------------------------------------------------------------
    // Liveness and state
    // -----------------------------------------------------------------------

    /// Record that the agent is alive, optionally updating its state.
    pub async fn heartbeat(
        &self,
        agent_id: DbId,
        reported_state: Option<AgentState>,
    ) -> CoordResult<Agent> {
        let agent = AgentRepo::heartbeat(&self.pool, agent_id, reported_state)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        tracing::debug!(agent_id, state = ?reported_state, "Agent heartbeat");
        if reported_state.is_some() {
            self.notify(Change::Agent { agent_id });
        }
        Ok(agent)
    }

    /// Set the agent's lifecycle state directly.
    pub async fn update_state(&self, agent_id: DbId, state: AgentState) -> CoordResult<Agent> {
        let mut conn = self.pool.acquire().await?;
        if !AgentRepo::set_state(&mut *conn, agent_id, state).await? {
            return Err(agent_not_found(agent_id));
        }
        drop(conn);

        tracing::info!(agent_id, %state, "Agent state updated");
        self.notify(Change::Agent { agent_id });
        self.get_agent(agent_id).await
    }

    /// The agent is going away cleanly.
    pub async fn shutdown(&self, agent_id: DbId) -> CoordResult<Agent> {
        self.update_state(agent_id, AgentState::Stopped).await
    }

    /// Administrative toggle. Disabling never interrupts a running task.
    pub async fn set_enabled(&self, agent_id: DbId, enabled: bool) -> CoordResult<Agent> {
        let agent = AgentRepo::set_enabled(&self.pool, agent_id, enabled)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        tracing::info!(agent_id, enabled, "Agent enabled flag changed");
        self.notify(Change::Agent { agent_id });
        Ok(agent)
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    /// Log an agent-reported error. Major and above force the agent into
    /// the error state from any state.
    pub async fn report_error(
        &self,
        agent_id: DbId,
        input: AgentErrorInput,
    ) -> CoordResult<AgentError> {
        let report = input.into_report()?;

        let mut tx = self.pool.begin().await?;
        AgentRepo::lock(&mut *tx, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        if let Some(task_id) = report.task_id {
            let task = TaskRepo::lock_shared(&mut *tx, task_id)
                .await?
                .ok_or_else(|| task_not_found(task_id))?;
            task_lifecycle::check_ownership(&task.snapshot()?, agent_id)?;
        }

        let error = AgentErrorRepo::insert(&mut *tx, agent_id, &report).await?;
        let forced = report.severity.forces_error_state();
        if forced {
            AgentRepo::set_state(&mut *tx, agent_id, AgentState::Error).await?;
        }
        tx.commit().await?;

        if forced {
            tracing::warn!(
                agent_id,
                severity = %report.severity,
                message = %report.message,
                "Agent reported a major error, marked as error",
            );
        } else {
            tracing::info!(agent_id, severity = %report.severity, "Agent reported an error");
        }
        self.notify(Change::Agent { agent_id });
        Ok(error)
    }

    pub async fn list_errors(&self, agent_id: DbId, limit: i64) -> CoordResult<Vec<AgentError>> {
        self.get_agent(agent_id).await?;
        Ok(AgentErrorRepo::list_for_agent(&self.pool, agent_id, limit).await?)
    }

    // -----------------------------------------------------------------------
    // Benchmarks and capability
    // -----------------------------------------------------------------------

    /// Replace the agent's benchmark set. A pending agent becomes active.
    pub async fn submit_benchmarks(
        &self,
        agent_id: DbId,
        entries: Vec<BenchmarkEntry>,
    ) -> CoordResult<Vec<Benchmark>> {
        benchmarks::validate_batch(&entries)?;

        let mut tx = self.pool.begin().await?;
        let agent = AgentRepo::lock(&mut *tx, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        let rows = BenchmarkRepo::replace_for_agent(&mut *tx, agent_id, &entries).await?;
        if agent.state()? == AgentState::Pending {
            AgentRepo::set_state(&mut *tx, agent_id, AgentState::Active).await?;
        }
        tx.commit().await?;

        tracing::info!(agent_id, count = rows.len(), "Benchmarks replaced");
        self.notify(Change::Agent { agent_id });
        Ok(rows)
    }

    /// Retire the agent's benchmarks and send it back to pending so it
    /// re-benchmarks before receiving more work.
    pub async fn request_benchmark(&self, agent_id: DbId) -> CoordResult<Agent> {
        let mut tx = self.pool.begin().await?;
        AgentRepo::lock(&mut *tx, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;
        let retired = BenchmarkRepo::retire_for_agent(&mut *tx, agent_id).await?;
        AgentRepo::set_state(&mut *tx, agent_id, AgentState::Pending).await?;
        tx.commit().await?;

        tracing::info!(agent_id, retired, "Benchmark requested");
        self.notify(Change::Agent { agent_id });
        self.get_agent(agent_id).await
    }

    /// Whether the agent has a current benchmark for `hash_type_id`.
    pub async fn can_handle(&self, agent_id: DbId, hash_type_id: i32) -> CoordResult<bool> {
        Ok(BenchmarkRepo::can_handle(&self.pool, agent_id, hash_type_id).await?)
    }

    /// Current benchmarks grouped by hash type.
    pub async fn benchmark_summary(&self, agent_id: DbId) -> CoordResult<Vec<HashTypeCapability>> {
        self.get_agent(agent_id).await?;
        let rows = BenchmarkRepo::list_current(&self.pool, agent_id).await?;
        let entries: Vec<BenchmarkEntry> = rows.iter().map(Benchmark::entry).collect();
        Ok(benchmarks::summarize(&entries))
    }

    /// Per-device throughput buckets within `window` of now.
    pub async fn device_performance(
        &self,
        agent_id: DbId,
        window: Duration,
    ) -> CoordResult<Vec<DevicePerformancePoint>> {
        self.get_agent(agent_id).await?;
        let window = chrono::Duration::from_std(window)
            .map_err(|_| CoreError::Validation("performance window is too large".into()))?;
        let since = Utc::now() - window;
        Ok(DevicePerformanceRepo::series_since(&self.pool, agent_id, since).await?)
    }
}
