//! Worker registry, benchmark store and error reporting.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use cipherswarm_coordinator::{Assignment, CoordError};
use cipherswarm_core::agent_errors::AgentErrorInput;
use cipherswarm_core::error::CoreError;
use cipherswarm_core::status::{AgentState, TaskStatus};
use common::{
    benchmark, capable_agent, coordinator, insert_pending_task, register, seed_attack, snapshot,
    MD5, NTLM,
};
use sqlx::PgPool;

fn error_input(severity: &str, task_id: Option<i64>) -> AgentErrorInput {
    AgentErrorInput {
        severity: severity.to_string(),
        message: "Device #1: CUDA error".to_string(),
        error_code: Some("cuda".to_string()),
        details: None,
        task_id,
    }
}

// ---------------------------------------------------------------------------
// Registration and tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_mints_a_working_token(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let (agent, token) = register(&coordinator, "rig-01").await;

    assert_eq!(agent.state().unwrap(), AgentState::Pending);
    assert!(agent.enabled);

    let resolved = coordinator.authenticate(&token).await.unwrap();
    assert_eq!(resolved.id, agent.id);

    let err = coordinator.authenticate("csa_1_not-a-real-secret").await.unwrap_err();
    assert_matches!(err, CoordError::Core(CoreError::Unauthorized(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn re_registration_creates_a_new_agent(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let (first, first_token) = register(&coordinator, "rig-01").await;
    let (second, second_token) = register(&coordinator, "rig-01").await;

    assert_ne!(first.id, second.id);
    assert_ne!(first_token, second_token);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_identity_is_rejected(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let err = coordinator
        .register(cipherswarm_db::models::agent::NewAgent {
            host_name: "  ".to_string(),
            client_signature: "agent".to_string(),
            operating_system: "linux".to_string(),
            agent_type: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoordError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Heartbeat and state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn heartbeat_touches_last_seen(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let (agent, _) = register(&coordinator, "rig-01").await;
    assert!(agent.last_seen_at.is_none());

    let seen = coordinator.heartbeat(agent.id, None).await.unwrap();
    assert!(seen.last_seen_at.is_some());
    assert_eq!(seen.state().unwrap(), AgentState::Pending);

    let active = coordinator
        .heartbeat(agent.id, Some(AgentState::Active))
        .await
        .unwrap();
    assert_eq!(active.state().unwrap(), AgentState::Active);

    let stopped = coordinator.shutdown(agent.id).await.unwrap();
    assert_eq!(stopped.state().unwrap(), AgentState::Stopped);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabling_keeps_running_task(pool: PgPool) {
    let fixture = seed_attack(&pool, MD5).await;
    insert_pending_task(&pool, fixture.attack_id, 1000).await;
    let (coordinator, _) = coordinator(pool);
    let agent = capable_agent(&coordinator, "rig-01", MD5).await;
    let Assignment::Assigned(task) = coordinator.assign(agent.id).await.unwrap() else {
        panic!("expected an assignment");
    };

    coordinator.set_enabled(agent.id, false).await.unwrap();

    let still = coordinator.get_task(task.id, agent.id).await.unwrap();
    assert_eq!(still.status().unwrap(), TaskStatus::Running);
}

// ---------------------------------------------------------------------------
// Error reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn major_error_forces_error_state(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let agent = capable_agent(&coordinator, "rig-01", MD5).await;
    coordinator.shutdown(agent.id).await.unwrap();

    coordinator
        .report_error(agent.id, error_input("warning", None))
        .await
        .unwrap();
    assert_eq!(
        coordinator.get_agent(agent.id).await.unwrap().state().unwrap(),
        AgentState::Stopped
    );

    coordinator
        .report_error(agent.id, error_input("major", None))
        .await
        .unwrap();
    assert_eq!(
        coordinator.get_agent(agent.id).await.unwrap().state().unwrap(),
        AgentState::Error
    );

    let errors = coordinator.list_errors(agent.id, 10).await.unwrap();
    assert_eq!(errors.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_severity_is_rejected(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let (agent, _) = register(&coordinator, "rig-01").await;

    let err = coordinator
        .report_error(agent.id, error_input("catastrophic", None))
        .await
        .unwrap_err();
    assert_matches!(err, CoordError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn error_for_foreign_task_is_forbidden(pool: PgPool) {
    let fixture = seed_attack(&pool, MD5).await;
    insert_pending_task(&pool, fixture.attack_id, 1000).await;
    let (coordinator, _) = coordinator(pool);
    let holder = capable_agent(&coordinator, "rig-a", MD5).await;
    let other = capable_agent(&coordinator, "rig-b", MD5).await;
    let task_id = coordinator.assign(holder.id).await.unwrap().task().unwrap().id;

    let err = coordinator
        .report_error(other.id, error_input("minor", Some(task_id)))
        .await
        .unwrap_err();
    assert_matches!(err, CoordError::Core(CoreError::Forbidden(_)));
}

// ---------------------------------------------------------------------------
// Benchmarks and capability
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn benchmarks_activate_and_define_capability(pool: PgPool) {
    let (coordinator, _) = coordinator(pool);
    let (agent, _) = register(&coordinator, "rig-01").await;
    assert!(!coordinator.can_handle(agent.id, MD5).await.unwrap());

    let mut second_gpu = benchmark(MD5);
    second_gpu.device = "RTX 3080".to_string();
    coordinator
        .submit_benchmarks(agent.id, vec![benchmark(MD5), second_gpu, benchmark(NTLM)])
        .await
        .unwrap();

    assert_eq!(
        coordinator.get_agent(agent.id).await.unwrap().state().unwrap(),
        AgentState::Active
    );
    assert!(coordinator.can_handle(agent.id, MD5).await.unwrap());
    assert!(!coordinator.can_handle(agent.id, 22000).await.unwrap());

    let summary = coordinator.benchmark_summary(agent.id).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].hash_type_id, MD5);
    assert_eq!(summary[0].device_count, 2);

    let err = coordinator.submit_benchmarks(agent.id, Vec::new()).await.unwrap_err();
    assert_matches!(err, CoordError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn requested_benchmark_removes_capability(pool: PgPool) {
    let fixture = seed_attack(&pool, MD5).await;
    insert_pending_task(&pool, fixture.attack_id, 1000).await;
    let (coordinator, _) = coordinator(pool);
    let agent = capable_agent(&coordinator, "rig-01", MD5).await;

    let pending = coordinator.request_benchmark(agent.id).await.unwrap();
    assert_eq!(pending.state().unwrap(), AgentState::Pending);
    assert!(!coordinator.can_handle(agent.id, MD5).await.unwrap());
    assert_matches!(coordinator.assign(agent.id).await.unwrap(), Assignment::NoneAvailable);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_performance_reports_recent_buckets(pool: PgPool) {
    let fixture = seed_attack(&pool, MD5).await;
    insert_pending_task(&pool, fixture.attack_id, 1000).await;
    let (coordinator, _) = coordinator(pool);
    let agent = capable_agent(&coordinator, "rig-01", MD5).await;
    let task_id = coordinator.assign(agent.id).await.unwrap().task().unwrap().id;

    let mut report = snapshot(100, 1000);
    report.time = chrono::Utc::now();
    coordinator.report_status(task_id, agent.id, report).await.unwrap();

    let series = coordinator
        .device_performance(agent.id, Duration::from_secs(3600))
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].device_name, "RTX 4090");
    assert_eq!(series[0].max_speed, 1_000_000);
}
