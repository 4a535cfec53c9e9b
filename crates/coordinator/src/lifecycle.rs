//! Task lifecycle operations.
//!
//! Each call locks the task row, re-checks ownership and state with
//! [`task_lifecycle::check_transition`], writes conditionally on the status
//! it just read, and commits before notifying.

use cipherswarm_core::cracks;
use cipherswarm_core::error::{CoreError, TaskConflict};
use cipherswarm_core::keyspace;
use cipherswarm_core::task_details::{ProgressUpdate, TaskDetails, TaskResult};
use cipherswarm_core::task_lifecycle::{self, Transition};
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::attack::AttackScope;
use cipherswarm_db::models::task::{NewTask, Task};
use cipherswarm_db::repositories::{AgentRepo, AttackRepo, CrackRepo, TaskRepo};
use cipherswarm_events::Change;
use sqlx::PgConnection;

use crate::error::{agent_not_found, attack_not_found, task_not_found, CoordResult};
use crate::Coordinator;

impl Coordinator {
    // -----------------------------------------------------------------------
    // Agent-driven transitions
    // -----------------------------------------------------------------------

    /// Take a pre-offered pending task.
    pub async fn accept(&self, task_id: DbId, agent_id: DbId) -> CoordResult<Task> {
        let mut tx = self.pool.begin().await?;

        // Agent before task, the same order `assign` locks in.
        let agent = AgentRepo::lock(&mut *tx, agent_id)
            .await?
            .ok_or_else(|| agent_not_found(agent_id))?;

        let task = TaskRepo::lock(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        task_lifecycle::check_transition(&task.snapshot()?, Transition::Accept, Some(agent_id))?;

        if !agent.enabled {
            return Err(CoreError::Forbidden(format!("agent {agent_id} is disabled")).into());
        }
        if let Some(running) = TaskRepo::find_running(&mut *tx, agent_id).await? {
            return Err(CoreError::task_conflict(running.id, TaskConflict::AgentBusy).into());
        }

        let accepted = TaskRepo::accept(&mut *tx, task_id, agent_id)
            .await?
            .ok_or_else(|| CoreError::task_conflict(task_id, TaskConflict::AlreadyRunning))?;
        let scope = scope_of(&mut *tx, &accepted).await?;
        tx.commit().await?;

        tracing::info!(agent_id, task_id, "Task accepted");
        self.notify_task(&accepted, &scope);
        Ok(accepted)
    }

    /// The agent ran out of keyspace without further results.
    pub async fn exhaust(&self, task_id: DbId, agent_id: DbId) -> CoordResult<Task> {
        self.apply_transition(task_id, Some(agent_id), Transition::Exhaust, None)
            .await
    }

    /// The agent gives the task up. Not idempotent.
    pub async fn abandon(&self, task_id: DbId, agent_id: DbId) -> CoordResult<Task> {
        self.apply_transition(task_id, Some(agent_id), Transition::Abandon, None)
            .await
    }

    /// Final outcome: success completes the task, an error fails it.
    pub async fn submit_result(
        &self,
        task_id: DbId,
        agent_id: DbId,
        result: TaskResult,
    ) -> CoordResult<Task> {
        result.validate()?;
        let transition = if result.is_failure() {
            Transition::Fail
        } else {
            Transition::Succeed
        };
        let details = result.into_details();
        self.apply_transition(task_id, Some(agent_id), transition, Some(&details))
            .await
    }

    /// Lightweight progress report outside full status telemetry.
    pub async fn update_progress(
        &self,
        task_id: DbId,
        agent_id: DbId,
        update: ProgressUpdate,
    ) -> CoordResult<Task> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;
        let task = TaskRepo::lock(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        task_lifecycle::check_running_holder(&task.snapshot()?, agent_id)?;

        let details = TaskDetails::Progress(update);
        let updated = TaskRepo::record_progress(
            &mut *tx,
            task_id,
            update.progress_percent,
            update.keyspace_processed,
            Some(&details),
        )
        .await?
        .ok_or_else(|| task_not_found(task_id))?;
        let scope = scope_of(&mut *tx, &updated).await?;
        tx.commit().await?;

        tracing::debug!(agent_id, task_id, progress = update.progress_percent, "Task progress");
        self.notify_task(&updated, &scope);
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Administrative transitions
    // -----------------------------------------------------------------------

    pub async fn pause_task(&self, task_id: DbId) -> CoordResult<Task> {
        self.apply_transition(task_id, None, Transition::Pause, None).await
    }

    /// Put a paused task back to running. Refused while its holder runs
    /// other work, which `assign` may have handed out during the pause.
    pub async fn resume_task(&self, task_id: DbId) -> CoordResult<Task> {
        let holder = TaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?
            .agent_id;

        let mut tx = self.pool.begin().await?;

        // Agent before task, the same order `assign` locks in.
        if let Some(agent_id) = holder {
            AgentRepo::lock(&mut *tx, agent_id).await?;
        }
        let task = TaskRepo::lock(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        let snapshot = task.snapshot()?;
        let target = task_lifecycle::check_transition(&snapshot, Transition::Resume, None)?;

        if let Some(agent_id) = task.agent_id {
            if let Some(running) = TaskRepo::find_running(&mut *tx, agent_id).await? {
                tracing::debug!(task_id, agent_id, running_task_id = running.id, "Resume refused");
                return Err(CoreError::task_conflict(running.id, TaskConflict::AgentBusy).into());
            }
        }

        let resumed = TaskRepo::transition(&mut *tx, task_id, snapshot.status, target, None)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("task {task_id} changed under lock")))?;
        let scope = scope_of(&mut *tx, &resumed).await?;
        tx.commit().await?;

        tracing::info!(task_id, agent_id = ?resumed.agent_id, "Task resumed");
        self.notify_task(&resumed, &scope);
        Ok(resumed)
    }

    /// Split an attack's keyspace into `chunks` pending tasks.
    pub async fn enqueue_tasks(
        &self,
        attack_id: DbId,
        keyspace_total: i64,
        chunks: u32,
    ) -> CoordResult<Vec<Task>> {
        let ranges = keyspace::split_keyspace(keyspace_total, chunks)?;
        let new_tasks: Vec<NewTask> = ranges
            .iter()
            .map(|range| NewTask {
                keyspace_total: range.limit,
                skip: range.skip,
                limit_count: range.limit,
            })
            .collect();

        let mut tx = self.pool.begin().await?;
        let scope = AttackRepo::find_scope(&mut *tx, attack_id)
            .await?
            .ok_or_else(|| attack_not_found(attack_id))?;
        let created = TaskRepo::create_for_attack(&mut *tx, attack_id, &new_tasks).await?;
        tx.commit().await?;

        tracing::info!(attack_id, count = created.len(), keyspace_total, "Tasks enqueued");
        for task in &created {
            self.notify_task(task, &scope);
        }
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // Reads for the holder
    // -----------------------------------------------------------------------

    /// Every task of an attack, oldest first.
    pub async fn list_attack_tasks(&self, attack_id: DbId) -> CoordResult<Vec<Task>> {
        Ok(TaskRepo::list_for_attack(&self.pool, attack_id).await?)
    }

    /// Fetch a task; only its holder may see it.
    pub async fn get_task(&self, task_id: DbId, agent_id: DbId) -> CoordResult<Task> {
        let task = TaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        task_lifecycle::check_ownership(&task.snapshot()?, agent_id)?;
        Ok(task)
    }

    /// Already-cracked `hash:plain` lines from the task's hash list.
    pub async fn task_zaps(&self, task_id: DbId, agent_id: DbId) -> CoordResult<String> {
        let task = self.get_task(task_id, agent_id).await?;
        if let Some(conflict) = task_lifecycle::terminal_conflict(task.status()?) {
            return Err(CoreError::task_conflict(task_id, conflict).into());
        }

        let mut conn = self.pool.acquire().await?;
        let scope = AttackRepo::find_scope(&mut *conn, task.attack_id)
            .await?
            .ok_or_else(|| attack_not_found(task.attack_id))?;
        drop(conn);

        let pairs = CrackRepo::cracked_in_list(&self.pool, scope.hash_list_id).await?;
        Ok(cracks::format_zaps(
            pairs.iter().map(|p| (p.hash.as_str(), p.plain_text.as_str())),
        ))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn apply_transition(
        &self,
        task_id: DbId,
        agent_id: Option<DbId>,
        transition: Transition,
        details: Option<&TaskDetails>,
    ) -> CoordResult<Task> {
        let mut tx = self.pool.begin().await?;
        let task = TaskRepo::lock(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        let snapshot = task.snapshot()?;

        let target = match task_lifecycle::check_transition(&snapshot, transition, agent_id) {
            Ok(target) => target,
            Err(err) => {
                tracing::debug!(task_id, ?agent_id, ?transition, error = %err, "Transition refused");
                return Err(err.into());
            }
        };

        let updated = TaskRepo::transition(&mut *tx, task_id, snapshot.status, target, details)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("task {task_id} changed under lock")))?;
        let scope = scope_of(&mut *tx, &updated).await?;
        tx.commit().await?;

        tracing::info!(
            task_id,
            ?agent_id,
            from = %snapshot.status,
            to = %target,
            "Task transitioned"
        );
        self.notify_task(&updated, &scope);
        Ok(updated)
    }

    pub(crate) fn notify_task(&self, task: &Task, scope: &AttackScope) {
        self.notify(Change::Task {
            task_id: task.id,
            attack_id: scope.attack_id,
            project_id: scope.project_id,
        });
    }
}

pub(crate) async fn scope_of(conn: &mut PgConnection, task: &Task) -> CoordResult<AttackScope> {
    AttackRepo::find_scope(conn, task.attack_id)
        .await?
        .ok_or_else(|| attack_not_found(task.attack_id))
}
