//! Cracked-hash recording.

use cipherswarm_core::cracks::CrackSubmission;
use cipherswarm_core::error::CoreError;
use cipherswarm_core::task_lifecycle;
use cipherswarm_core::types::DbId;
use cipherswarm_db::repositories::{CrackRepo, TaskRepo};
use cipherswarm_events::Change;
use serde::Serialize;

use crate::error::{task_not_found, CoordResult};
use crate::lifecycle::scope_of;
use crate::Coordinator;

/// What a crack submission changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrackOutcome {
    pub hash_item_id: DbId,
    /// The hash item had no plaintext before this call.
    pub newly_solved: bool,
    /// A result row for this (agent, attack, hash item) already existed.
    pub duplicate: bool,
}

impl Coordinator {
    /// Record a recovered plaintext for a hash in the task's target list.
    ///
    /// Resubmitting the same crack succeeds without writing anything.
    pub async fn submit_crack(
        &self,
        task_id: DbId,
        agent_id: DbId,
        submission: CrackSubmission,
    ) -> CoordResult<CrackOutcome> {
        submission.validate()?;

        let mut tx = self.pool.begin().await?;
        // Shared lock: concurrent cracks on one task proceed together, but a
        // state transition waits for them.
        let task = TaskRepo::lock_shared(&mut *tx, task_id)
            .await?
            .ok_or_else(|| task_not_found(task_id))?;
        task_lifecycle::check_running_holder(&task.snapshot()?, agent_id)?;

        let scope = scope_of(&mut *tx, &task).await?;
        let item = CrackRepo::find_item_in_list(&mut *tx, scope.hash_list_id, &submission.hash)
            .await?
            .ok_or(CoreError::HashNotInTargetSet {
                hash_list_id: scope.hash_list_id,
            })?;

        let newly_solved =
            CrackRepo::set_plain_text_if_unset(&mut *tx, item.id, &submission.plain_text).await?;
        if !newly_solved && item.plain_text.as_deref() != Some(submission.plain_text.as_str()) {
            tracing::warn!(
                task_id,
                agent_id,
                hash_item_id = item.id,
                "Crack disagrees with stored plaintext; keeping the stored value"
            );
        }

        let recorded =
            CrackRepo::insert_if_absent(&mut *tx, agent_id, scope.attack_id, item.id, task_id)
                .await?;
        tx.commit().await?;

        let outcome = CrackOutcome {
            hash_item_id: item.id,
            newly_solved,
            duplicate: !recorded,
        };
        if newly_solved || recorded {
            tracing::info!(task_id, agent_id, hash_item_id = item.id, newly_solved, "Crack recorded");
            self.notify(Change::Crack {
                attack_id: scope.attack_id,
                project_id: scope.project_id,
                hash_item_id: item.id,
            });
        } else {
            tracing::debug!(task_id, agent_id, hash_item_id = item.id, "Duplicate crack ignored");
        }
        Ok(outcome)
    }

    /// Number of result rows recorded against an attack.
    pub async fn crack_count(&self, attack_id: DbId) -> CoordResult<i64> {
        Ok(CrackRepo::count_for_attack(&self.pool, attack_id).await?)
    }
}
