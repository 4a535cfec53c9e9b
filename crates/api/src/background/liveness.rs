//! Periodic reaping of running tasks whose agents went silent.
//!
//! Only spawned when `AGENT_LIVENESS_DEADLINE_SECS` is set. Each pass abandons
//! every running task held by an agent not seen within the deadline and
//! queues a replacement for it.

use std::sync::Arc;

use chrono::Utc;
use cipherswarm_coordinator::Coordinator;
use cipherswarm_core::liveness::LivenessPolicy;
use tokio_util::sync::CancellationToken;

/// Run the liveness loop until `cancel` is triggered.
pub async fn run(coordinator: Arc<Coordinator>, policy: LivenessPolicy, cancel: CancellationToken) {
    tracing::info!(
        deadline_secs = policy.deadline.as_secs(),
        interval_secs = policy.check_interval.as_secs(),
        "Liveness reaper started"
    );

    let mut interval = tokio::time::interval(policy.check_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Liveness reaper stopping");
                break;
            }
            _ = interval.tick() => {
                match coordinator.reap_silent_agents(policy.cutoff(Utc::now())).await {
                    Ok(reaped) if reaped.is_empty() => {
                        tracing::debug!("Liveness reaper: no silent agents");
                    }
                    Ok(reaped) => {
                        tracing::info!(count = reaped.len(), "Liveness reaper: requeued tasks");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Liveness reaper: pass failed");
                    }
                }
            }
        }
    }
}
