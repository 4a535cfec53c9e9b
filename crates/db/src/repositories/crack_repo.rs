//! Repository for cracked results and the hash items they solve.

use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::crack::{CrackedPair, HashItem};

pub struct CrackRepo;

impl CrackRepo {
    /// Find a hash by value within one hash list.
    pub async fn find_item_in_list(
        conn: &mut PgConnection,
        hash_list_id: DbId,
        hash: &str,
    ) -> Result<Option<HashItem>, sqlx::Error> {
        sqlx::query_as::<_, HashItem>(
            "SELECT hi.id, hi.hash, hi.salt, hi.plain_text, hi.cracked_at \
             FROM hash_items hi \
             JOIN hash_list_items hli ON hli.hash_item_id = hi.id \
             WHERE hli.hash_list_id = $1 AND hi.hash = $2 \
             ORDER BY hi.id \
             LIMIT 1 \
             FOR UPDATE OF hi",
        )
        .bind(hash_list_id)
        .bind(hash)
        .fetch_optional(conn)
        .await
    }

    /// Write the plaintext only if the item is still unsolved.
    ///
    /// Returns `true` if this call solved the item.
    pub async fn set_plain_text_if_unset(
        conn: &mut PgConnection,
        hash_item_id: DbId,
        plain_text: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE hash_items SET plain_text = $2, cracked_at = NOW() \
             WHERE id = $1 AND plain_text IS NULL",
        )
        .bind(hash_item_id)
        .bind(plain_text)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the (agent, attack, item) triple unless it already exists.
    ///
    /// Returns `true` if a new row was inserted.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        agent_id: DbId,
        attack_id: DbId,
        hash_item_id: DbId,
        task_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let inserted: Option<(DbId,)> = sqlx::query_as(
            "INSERT INTO crack_results (agent_id, attack_id, hash_item_id, task_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_crack_results_agent_attack_item DO NOTHING \
             RETURNING id",
        )
        .bind(agent_id)
        .bind(attack_id)
        .bind(hash_item_id)
        .bind(task_id)
        .fetch_optional(conn)
        .await?;
        Ok(inserted.is_some())
    }

    /// Every solved hash in a list, in id order.
    pub async fn cracked_in_list(
        pool: &PgPool,
        hash_list_id: DbId,
    ) -> Result<Vec<CrackedPair>, sqlx::Error> {
        sqlx::query_as::<_, CrackedPair>(
            "SELECT hi.hash, hi.plain_text \
             FROM hash_items hi \
             JOIN hash_list_items hli ON hli.hash_item_id = hi.id \
             WHERE hli.hash_list_id = $1 AND hi.plain_text IS NOT NULL \
             ORDER BY hi.id",
        )
        .bind(hash_list_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_attack(pool: &PgPool, attack_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM crack_results WHERE attack_id = $1")
                .bind(attack_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
