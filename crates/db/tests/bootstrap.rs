use sqlx::PgPool;

/// Full bootstrap: connect, migrate, verify lookup seed data.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    cipherswarm_db::health_check(&pool).await.unwrap();

    let tables = [
        ("agent_states", 4),
        ("task_statuses", 6),
        ("error_severities", 6),
    ];

    for (table, expected) in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, expected, "{table} seed rows");
    }
}

/// Lookup ids must match the `#[repr(i16)]` discriminants.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_ids_match_enums(pool: PgPool) {
    use cipherswarm_core::status::{AgentState, ErrorSeverity, TaskStatus};

    for status in TaskStatus::ALL {
        let (name,): (String,) = sqlx::query_as("SELECT name FROM task_statuses WHERE id = $1")
            .bind(status.id())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, status.as_str());
    }
    for state in AgentState::ALL {
        let (name,): (String,) = sqlx::query_as("SELECT name FROM agent_states WHERE id = $1")
            .bind(state.id())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, state.as_str());
    }
    for severity in ErrorSeverity::ALL {
        let (name,): (String,) =
            sqlx::query_as("SELECT name FROM error_severities WHERE id = $1")
                .bind(severity.id())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(name, severity.as_str());
    }
}
