//! Repository for the `tasks` table.
//!
//! Every state change is a conditional write keyed on the expected current
//! status, so a stale caller affects zero rows instead of overwriting a
//! concurrent transition.

use cipherswarm_core::status::TaskStatus;
use cipherswarm_core::task_details::TaskDetails;
use cipherswarm_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::task::{NewTask, Task};

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, attack_id, agent_id, status_id, keyspace_total, skip, limit_count, \
    progress_percent, keyspace_processed, details, retry_count, retry_of_task_id, \
    assigned_at, activity_at, completed_at, created_at, updated_at";

/// Same list qualified with the `t` alias for joined queries.
const T_COLUMNS: &str = "\
    t.id, t.attack_id, t.agent_id, t.status_id, t.keyspace_total, t.skip, t.limit_count, \
    t.progress_percent, t.keyspace_processed, t.details, t.retry_count, t.retry_of_task_id, \
    t.assigned_at, t.activity_at, t.completed_at, t.created_at, t.updated_at";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert pending tasks for an attack, in order.
    pub async fn create_for_attack(
        conn: &mut PgConnection,
        attack_id: DbId,
        tasks: &[NewTask],
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (attack_id, status_id, keyspace_total, skip, limit_count) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(tasks.len());
        for task in tasks {
            let row = sqlx::query_as::<_, Task>(&query)
                .bind(attack_id)
                .bind(TaskStatus::Pending.id())
                .bind(task.keyspace_total)
                .bind(task.skip)
                .bind(task.limit_count)
                .fetch_one(&mut *conn)
                .await?;
            created.push(row);
        }
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read the task and hold its row lock until the caller commits.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Read the task with a share lock: concurrent readers proceed, state
    /// transitions wait until the caller commits.
    pub async fn lock_shared(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_for_attack(pool: &PgPool, attack_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE attack_id = $1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(attack_id)
            .fetch_all(pool)
            .await
    }

    /// The running task the agent holds, if any.
    pub async fn find_running(
        conn: &mut PgConnection,
        agent_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE agent_id = $1 AND status_id = $2 LIMIT 1"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(agent_id)
            .bind(TaskStatus::Running.id())
            .fetch_optional(conn)
            .await
    }

    /// Atomically claim the oldest pending task the agent can handle.
    ///
    /// Candidates are unassigned pending tasks with a positive keyspace whose
    /// attack's hash mode has a current benchmark for the agent, scanned in
    /// id order. `FOR UPDATE SKIP LOCKED` keeps competing agents off the
    /// same row, and the outer predicate re-checks the claim conditions.
    pub async fn claim_next(
        conn: &mut PgConnection,
        agent_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks \
             SET agent_id = $1, status_id = $2, assigned_at = NOW(), activity_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = ( \
                 SELECT t.id FROM tasks t \
                 JOIN attacks a ON a.id = t.attack_id \
                 WHERE t.status_id = $3 AND t.agent_id IS NULL AND t.keyspace_total > 0 \
                   AND EXISTS ( \
                       SELECT 1 FROM benchmarks b \
                       WHERE b.agent_id = $1 AND b.hash_type_id = a.hash_mode \
                         AND b.retired_at IS NULL \
                   ) \
                 ORDER BY t.id \
                 LIMIT 1 \
                 FOR UPDATE OF t SKIP LOCKED \
             ) \
             AND status_id = $3 AND agent_id IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(agent_id)
            .bind(TaskStatus::Running.id())
            .bind(TaskStatus::Pending.id())
            .fetch_optional(conn)
            .await
    }

    /// Bind a pending task to the accepting agent.
    pub async fn accept(
        conn: &mut PgConnection,
        id: DbId,
        agent_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks \
             SET agent_id = $2, status_id = $3, assigned_at = NOW(), activity_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 AND agent_id IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(agent_id)
            .bind(TaskStatus::Running.id())
            .bind(TaskStatus::Pending.id())
            .fetch_optional(conn)
            .await
    }

    /// Move a task from `from` to `to`, optionally replacing its details.
    ///
    /// Returns `None` if the task was no longer in `from`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: DbId,
        from: TaskStatus,
        to: TaskStatus,
        details: Option<&TaskDetails>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks \
             SET status_id = $3, \
                 details = COALESCE($4, details), \
                 progress_percent = CASE WHEN $5 THEN 100 ELSE progress_percent END, \
                 completed_at = CASE WHEN $6 THEN NOW() ELSE completed_at END, \
                 activity_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(details.map(Json))
            .bind(to == TaskStatus::Completed)
            .bind(to.is_terminal())
            .fetch_optional(conn)
            .await
    }

    /// Write progress and return the row as it stands after the write.
    pub async fn record_progress(
        conn: &mut PgConnection,
        id: DbId,
        progress_percent: f64,
        keyspace_processed: i64,
        details: Option<&TaskDetails>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks \
             SET progress_percent = $2, keyspace_processed = $3, \
                 details = COALESCE($4, details), \
                 activity_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(progress_percent)
            .bind(keyspace_processed)
            .bind(details.map(Json))
            .fetch_optional(conn)
            .await
    }

    /// Lock running tasks whose agent was last seen before `cutoff`.
    ///
    /// Agents that never heartbeated are judged by their registration time.
    pub async fn lock_stale_running(
        conn: &mut PgConnection,
        cutoff: Timestamp,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS} FROM tasks t \
             JOIN agents ag ON ag.id = t.agent_id \
             WHERE t.status_id = $1 AND COALESCE(ag.last_seen_at, ag.created_at) < $2 \
             ORDER BY t.id \
             FOR UPDATE OF t SKIP LOCKED"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(TaskStatus::Running.id())
            .bind(cutoff)
            .fetch_all(conn)
            .await
    }

    /// Insert a fresh pending copy of `task` covering the same range.
    pub async fn requeue(conn: &mut PgConnection, task: &Task) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                 (attack_id, status_id, keyspace_total, skip, limit_count, retry_count, retry_of_task_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task.attack_id)
            .bind(TaskStatus::Pending.id())
            .bind(task.keyspace_total)
            .bind(task.skip)
            .bind(task.limit_count)
            .bind(task.retry_count + 1)
            .bind(task.id)
            .fetch_one(conn)
            .await
    }
}
