//! Rolling per-device throughput buckets.

use cipherswarm_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::device_performance::DevicePerformancePoint;

pub struct DevicePerformanceRepo;

impl DevicePerformanceRepo {
    /// Fold one speed sample into its (agent, device, bucket) row.
    pub async fn record_sample(
        conn: &mut PgConnection,
        agent_id: DbId,
        device_name: &str,
        bucket_start: Timestamp,
        speed: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO agent_device_performance \
                 (agent_id, device_name, bucket_start, sample_count, speed_sum, speed_max) \
             VALUES ($1, $2, $3, 1, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_agent_device_performance_bucket DO UPDATE SET \
                 sample_count = agent_device_performance.sample_count + 1, \
                 speed_sum = agent_device_performance.speed_sum + EXCLUDED.speed_sum, \
                 speed_max = GREATEST(agent_device_performance.speed_max, EXCLUDED.speed_max), \
                 updated_at = NOW()",
        )
        .bind(agent_id)
        .bind(device_name)
        .bind(bucket_start)
        .bind(speed as f64)
        .bind(speed)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Buckets at or after `since`, oldest first, grouped by device.
    pub async fn series_since(
        pool: &PgPool,
        agent_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<DevicePerformancePoint>, sqlx::Error> {
        sqlx::query_as::<_, DevicePerformancePoint>(
            "SELECT device_name, bucket_start, sample_count, \
                    speed_sum / GREATEST(sample_count, 1) AS avg_speed, \
                    speed_max AS max_speed \
             FROM agent_device_performance \
             WHERE agent_id = $1 AND bucket_start >= $2 \
             ORDER BY device_name, bucket_start",
        )
        .bind(agent_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
