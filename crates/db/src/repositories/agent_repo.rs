//! Repository for the `agents` table.

use cipherswarm_core::agent_token;
use cipherswarm_core::status::AgentState;
use cipherswarm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::agent::{Agent, NewAgent, RegisteredAgent};

/// Column list for `agents` queries. `token_hash` is deliberately absent.
const COLUMNS: &str = "\
    id, host_name, client_signature, operating_system, agent_type, \
    state_id, enabled, last_seen_at, created_at, updated_at";

/// Provides registry operations for agents.
pub struct AgentRepo;

impl AgentRepo {
    /// Insert a new pending agent and mint its capability token.
    ///
    /// The id is drawn from the sequence first so the token can embed it
    /// and the row is written once with its final digest.
    pub async fn register(pool: &PgPool, input: &NewAgent) -> Result<RegisteredAgent, sqlx::Error> {
        let (id,): (DbId,) =
            sqlx::query_as("SELECT nextval(pg_get_serial_sequence('agents', 'id'))")
                .fetch_one(pool)
                .await?;

        let token = agent_token::mint_token(id);

        let query = format!(
            "INSERT INTO agents \
                (id, host_name, client_signature, operating_system, agent_type, state_id, token_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let agent = sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(&input.host_name)
            .bind(&input.client_signature)
            .bind(&input.operating_system)
            .bind(&input.agent_type)
            .bind(AgentState::Pending.id())
            .bind(&token.hash)
            .fetch_one(pool)
            .await?;

        Ok(RegisteredAgent {
            agent,
            token: token.plaintext,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE id = $1");
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up the agent owning a token digest.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE token_hash = $1");
        sqlx::query_as::<_, Agent>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Lock the agent row for the rest of the caller's transaction.
    ///
    /// Serializes concurrent assignment attempts by the same agent.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Record a heartbeat, optionally updating the reported state.
    pub async fn heartbeat(
        pool: &PgPool,
        id: DbId,
        state: Option<AgentState>,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "UPDATE agents \
             SET last_seen_at = NOW(), state_id = COALESCE($2, state_id), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(state.map(AgentState::id))
            .fetch_optional(pool)
            .await
    }

    /// Set the lifecycle state. Returns `true` if the agent exists.
    pub async fn set_state(
        conn: &mut PgConnection,
        id: DbId,
        state: AgentState,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE agents SET state_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(state.id())
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Administrative enable/disable toggle.
    pub async fn set_enabled(
        pool: &PgPool,
        id: DbId,
        enabled: bool,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "UPDATE agents SET enabled = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }
}
