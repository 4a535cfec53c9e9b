//! Status telemetry ingestion.

use cipherswarm_core::status::TaskStatus;
use cipherswarm_core::task_lifecycle;
use cipherswarm_core::telemetry::{self, StatusAck, StatusSnapshot};
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::status_update::{DeviceStatus, StatusUpdate};
use cipherswarm_db::repositories::{DevicePerformanceRepo, StatusUpdateRepo, TaskRepo};

use crate::error::{task_not_found, CoordResult};
use crate::lifecycle::scope_of;
use crate::Coordinator;

impl Coordinator {
    /// Ingest one periodic status snapshot and tell the agent how to proceed.
    ///
    /// Ownership is checked first. A terminal task yields [`StatusAck::Stale`]
    /// and a malformed snapshot yields [`StatusAck::Rejected`]; neither
    /// persists anything. Otherwise the snapshot, its guess record, its device
    /// rows, the rolling device buckets and the task progress are written in
    /// one transaction under the task lock, and the acknowledgement is derived
    /// from the row as it stands after that write.
    pub async fn report_status(
        &self,
        task_id: DbId,
        agent_id: DbId,
        snapshot: StatusSnapshot,
    ) -> CoordResult<StatusAck> {
        let mut tx = self.pool.begin().await?;
        let task = TaskRepo::lock(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        let current = task.snapshot()?;
        task_lifecycle::check_ownership(&current, agent_id)?;

        if current.status.is_terminal() {
            tracing::debug!(task_id, agent_id, status = %current.status, "Status report on finished task");
            return Ok(StatusAck::Stale);
        }

        let validated = match snapshot.validate() {
            Ok(validated) => validated,
            Err(err) => {
                tracing::warn!(task_id, agent_id, error = %err, "Malformed status report");
                return Ok(StatusAck::Rejected {
                    reason: err.to_string(),
                });
            }
        };

        StatusUpdateRepo::insert(&mut *tx, task_id, agent_id, &validated).await?;

        let bucket = telemetry::bucket_start(validated.snapshot.time, self.config.device_bucket_secs);
        for device in &validated.devices {
            DevicePerformanceRepo::record_sample(
                &mut *tx,
                agent_id,
                &device.device_name,
                bucket,
                device.speed,
            )
            .await?;
        }

        let percent = telemetry::progress_percent(validated.snapshot.progress);
        let [processed, _] = validated.snapshot.progress;
        let updated = TaskRepo::record_progress(&mut *tx, task_id, percent, processed, None)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        let scope = scope_of(&mut *tx, &updated).await?;
        tx.commit().await?;

        let status_after = updated.status()?;
        let ack = telemetry::derive_ack(status_after, updated.progress_percent);
        if status_after == TaskStatus::Paused {
            tracing::info!(task_id, agent_id, "Status report on paused task");
        } else {
            tracing::debug!(task_id, agent_id, progress = percent, ?ack, "Status report accepted");
        }
        self.notify_task(&updated, &scope);
        Ok(ack)
    }

    /// Most recent snapshots for a task, newest first.
    pub async fn status_history(
        &self,
        task_id: DbId,
        limit: Option<i64>,
    ) -> CoordResult<Vec<StatusUpdate>> {
        TaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        Ok(StatusUpdateRepo::list_for_task(&self.pool, task_id, limit).await?)
    }

    pub async fn status_devices(&self, status_update_id: DbId) -> CoordResult<Vec<DeviceStatus>> {
        Ok(StatusUpdateRepo::devices_for_update(&self.pool, status_update_id).await?)
    }
}
