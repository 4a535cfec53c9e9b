//! Repository for append-only status telemetry.
//!
//! A snapshot spans three tables (update, guess, devices). Callers insert it
//! inside their own transaction together with the task progress write and
//! the device performance fold.

use cipherswarm_core::telemetry::ValidatedSnapshot;
use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::status_update::{DeviceStatus, StatusUpdate};

const COLUMNS: &str = "\
    id, task_id, agent_id, original_line, reported_at, session, status, target, \
    progress_processed, progress_total, restore_point, \
    recovered_hashes, recovered_hashes_total, recovered_salts, recovered_salts_total, \
    rejected, time_start, estimated_stop, created_at";

const DEVICE_COLUMNS: &str = "\
    id, status_update_id, device_id, device_name, device_type, speed, utilization, temperature";

/// Default page size for status history.
const DEFAULT_LIMIT: i64 = 50;

pub struct StatusUpdateRepo;

impl StatusUpdateRepo {
    /// Insert a snapshot with its guess record and device rows.
    pub async fn insert(
        conn: &mut PgConnection,
        task_id: DbId,
        agent_id: DbId,
        validated: &ValidatedSnapshot,
    ) -> Result<StatusUpdate, sqlx::Error> {
        let s = &validated.snapshot;
        let [processed, total] = s.progress;
        let [recovered_hashes, recovered_hashes_total] = s.recovered_hashes;
        let [recovered_salts, recovered_salts_total] = s.recovered_salts;

        let query = format!(
            "INSERT INTO task_status_updates \
                 (task_id, agent_id, original_line, reported_at, session, status, target, \
                  progress_processed, progress_total, restore_point, \
                  recovered_hashes, recovered_hashes_total, recovered_salts, recovered_salts_total, \
                  rejected, time_start, estimated_stop) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        let update = sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(task_id)
            .bind(agent_id)
            .bind(&s.original_line)
            .bind(s.time)
            .bind(&s.session)
            .bind(s.status)
            .bind(&s.target)
            .bind(processed)
            .bind(total)
            .bind(s.restore_point)
            .bind(recovered_hashes)
            .bind(recovered_hashes_total)
            .bind(recovered_salts)
            .bind(recovered_salts_total)
            .bind(s.rejected)
            .bind(s.time_start)
            .bind(s.estimated_stop)
            .fetch_one(&mut *conn)
            .await?;

        let g = &validated.guess;
        sqlx::query(
            "INSERT INTO task_status_guesses \
                 (status_update_id, guess_base, guess_base_count, guess_base_offset, \
                  guess_base_percentage, guess_mod, guess_mod_count, guess_mod_offset, \
                  guess_mod_percentage, guess_mode) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(update.id)
        .bind(&g.guess_base)
        .bind(g.guess_base_count)
        .bind(g.guess_base_offset)
        .bind(g.guess_base_percentage)
        .bind(&g.guess_mod)
        .bind(g.guess_mod_count)
        .bind(g.guess_mod_offset)
        .bind(g.guess_mod_percentage)
        .bind(g.guess_mode)
        .execute(&mut *conn)
        .await?;

        for device in &validated.devices {
            sqlx::query(
                "INSERT INTO task_device_statuses \
                     (status_update_id, device_id, device_name, device_type, speed, utilization, temperature) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(update.id)
            .bind(device.device_id)
            .bind(&device.device_name)
            .bind(&device.device_type)
            .bind(device.speed)
            .bind(device.utilization)
            .bind(device.temperature)
            .execute(&mut *conn)
            .await?;
        }

        Ok(update)
    }

    /// Most recent snapshots for a task.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<StatusUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_status_updates \
             WHERE task_id = $1 \
             ORDER BY reported_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(task_id)
            .bind(limit.unwrap_or(DEFAULT_LIMIT).max(1))
            .fetch_all(pool)
            .await
    }

    pub async fn devices_for_update(
        pool: &PgPool,
        status_update_id: DbId,
    ) -> Result<Vec<DeviceStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {DEVICE_COLUMNS} FROM task_device_statuses \
             WHERE status_update_id = $1 \
             ORDER BY device_id"
        );
        sqlx::query_as::<_, DeviceStatus>(&query)
            .bind(status_update_id)
            .fetch_all(pool)
            .await
    }
}
