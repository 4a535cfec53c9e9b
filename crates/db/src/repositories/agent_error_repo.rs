//! Repository for the `agent_errors` table.

use cipherswarm_core::agent_errors::AgentErrorReport;
use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::agent_error::AgentError;

const COLUMNS: &str = "\
    id, agent_id, task_id, severity_id, message, error_code, details, created_at";

/// Maximum page size for error listing.
const MAX_LIMIT: i64 = 200;

pub struct AgentErrorRepo;

impl AgentErrorRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        agent_id: DbId,
        report: &AgentErrorReport,
    ) -> Result<AgentError, sqlx::Error> {
        let query = format!(
            "INSERT INTO agent_errors (agent_id, task_id, severity_id, message, error_code, details) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AgentError>(&query)
            .bind(agent_id)
            .bind(report.task_id)
            .bind(report.severity.id())
            .bind(&report.message)
            .bind(&report.error_code)
            .bind(&report.details)
            .fetch_one(conn)
            .await
    }

    /// Most recent errors first.
    pub async fn list_for_agent(
        pool: &PgPool,
        agent_id: DbId,
        limit: i64,
    ) -> Result<Vec<AgentError>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM agent_errors \
             WHERE agent_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, AgentError>(&query)
            .bind(agent_id)
            .bind(limit.clamp(1, MAX_LIMIT))
            .fetch_all(pool)
            .await
    }
}
