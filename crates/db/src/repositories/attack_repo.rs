//! Read access to attacks and their campaign scope.

use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::attack::{Attack, AttackScope};

const SCOPE_QUERY: &str = "\
    SELECT a.id AS attack_id, c.project_id, c.hash_list_id, a.hash_mode \
    FROM attacks a \
    JOIN campaigns c ON c.id = a.campaign_id \
    WHERE a.id = $1";

pub struct AttackRepo;

impl AttackRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attack>, sqlx::Error> {
        sqlx::query_as::<_, Attack>(
            "SELECT id, campaign_id, name, hash_mode, created_at FROM attacks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Project and hash list an attack runs against.
    pub async fn find_scope(
        conn: &mut PgConnection,
        attack_id: DbId,
    ) -> Result<Option<AttackScope>, sqlx::Error> {
        sqlx::query_as::<_, AttackScope>(SCOPE_QUERY)
            .bind(attack_id)
            .fetch_optional(conn)
            .await
    }
}
