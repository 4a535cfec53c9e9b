//! Repository for the `benchmarks` table.
//!
//! A submission supersedes the agent's previous set wholesale: old rows get
//! `retired_at` and only current rows count as capability.

use cipherswarm_core::benchmarks::BenchmarkEntry;
use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::benchmark::Benchmark;

const COLUMNS: &str = "\
    id, agent_id, hash_type_id, runtime_ms, hash_speed, device, created_at, retired_at";

pub struct BenchmarkRepo;

impl BenchmarkRepo {
    /// Retire the agent's current rows and insert `entries` in their place.
    pub async fn replace_for_agent(
        conn: &mut PgConnection,
        agent_id: DbId,
        entries: &[BenchmarkEntry],
    ) -> Result<Vec<Benchmark>, sqlx::Error> {
        Self::retire_for_agent(&mut *conn, agent_id).await?;

        let query = format!(
            "INSERT INTO benchmarks (agent_id, hash_type_id, runtime_ms, hash_speed, device) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            let row = sqlx::query_as::<_, Benchmark>(&query)
                .bind(agent_id)
                .bind(entry.hash_type_id)
                .bind(entry.runtime_ms)
                .bind(entry.hash_speed)
                .bind(&entry.device)
                .fetch_one(&mut *conn)
                .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    /// Retire every current row for the agent. Returns the number retired.
    pub async fn retire_for_agent(
        conn: &mut PgConnection,
        agent_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE benchmarks SET retired_at = NOW() \
             WHERE agent_id = $1 AND retired_at IS NULL",
        )
        .bind(agent_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Current (non-retired) rows, ordered by hash type then device.
    pub async fn list_current(pool: &PgPool, agent_id: DbId) -> Result<Vec<Benchmark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM benchmarks \
             WHERE agent_id = $1 AND retired_at IS NULL \
             ORDER BY hash_type_id, device, id"
        );
        sqlx::query_as::<_, Benchmark>(&query)
            .bind(agent_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the agent has any current benchmark at all.
    pub async fn has_any(conn: &mut PgConnection, agent_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM benchmarks WHERE agent_id = $1 AND retired_at IS NULL)",
        )
        .bind(agent_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Whether the agent has a current benchmark for `hash_type_id`.
    pub async fn can_handle(
        pool: &PgPool,
        agent_id: DbId,
        hash_type_id: i32,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM benchmarks \
                 WHERE agent_id = $1 AND hash_type_id = $2 AND retired_at IS NULL \
             )",
        )
        .bind(agent_id)
        .bind(hash_type_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
