//! Shared fixtures for coordinator integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use cipherswarm_coordinator::{Coordinator, CoordinatorConfig};
use cipherswarm_core::benchmarks::BenchmarkEntry;
use cipherswarm_core::telemetry::{DeviceSnapshot, GuessSnapshot, StatusSnapshot};
use cipherswarm_core::types::DbId;
use cipherswarm_db::models::agent::{Agent, NewAgent};
use cipherswarm_events::EventBus;
use sqlx::PgPool;

pub const MD5: i32 = 0;
pub const NTLM: i32 = 1000;

/// Ids of a seeded project -> hash list -> campaign -> attack chain.
#[derive(Debug, Clone, Copy)]
pub struct AttackFixture {
    pub project_id: DbId,
    pub hash_list_id: DbId,
    pub attack_id: DbId,
}

pub fn coordinator(pool: PgPool) -> (Coordinator, Arc<EventBus>) {
    let bus = Arc::new(EventBus::default());
    let coordinator = Coordinator::new(pool, bus.clone(), CoordinatorConfig::default());
    (coordinator, bus)
}

pub async fn seed_attack(pool: &PgPool, hash_mode: i32) -> AttackFixture {
    let (project_id,): (DbId,) =
        sqlx::query_as("INSERT INTO projects (name) VALUES ('Audit') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let (hash_list_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO hash_lists (project_id, name) VALUES ($1, 'dump') RETURNING id",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (campaign_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO campaigns (project_id, hash_list_id, name) \
         VALUES ($1, $2, 'Q2') RETURNING id",
    )
    .bind(project_id)
    .bind(hash_list_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (attack_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO attacks (campaign_id, name, hash_mode) \
         VALUES ($1, 'wordlist', $2) RETURNING id",
    )
    .bind(campaign_id)
    .bind(hash_mode)
    .fetch_one(pool)
    .await
    .unwrap();

    AttackFixture {
        project_id,
        hash_list_id,
        attack_id,
    }
}

pub async fn add_hash(pool: &PgPool, hash_list_id: DbId, hash: &str) -> DbId {
    let (item_id,): (DbId,) =
        sqlx::query_as("INSERT INTO hash_items (hash) VALUES ($1) RETURNING id")
            .bind(hash)
            .fetch_one(pool)
            .await
            .unwrap();
    sqlx::query("INSERT INTO hash_list_items (hash_list_id, hash_item_id) VALUES ($1, $2)")
        .bind(hash_list_id)
        .bind(item_id)
        .execute(pool)
        .await
        .unwrap();
    item_id
}

/// Insert a pending task with a raw keyspace, bypassing enqueue validation.
pub async fn insert_pending_task(pool: &PgPool, attack_id: DbId, keyspace_total: i64) -> DbId {
    let (task_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO tasks (attack_id, status_id, keyspace_total, skip, limit_count) \
         VALUES ($1, 1, $2, 0, $2) RETURNING id",
    )
    .bind(attack_id)
    .bind(keyspace_total)
    .fetch_one(pool)
    .await
    .unwrap();
    task_id
}

pub async fn register(coordinator: &Coordinator, host_name: &str) -> (Agent, String) {
    let registered = coordinator
        .register(NewAgent {
            host_name: host_name.to_string(),
            client_signature: "CipherSwarm Agent/0.9".to_string(),
            operating_system: "linux".to_string(),
            agent_type: None,
        })
        .await
        .unwrap();
    (registered.agent, registered.token)
}

/// Register an agent and benchmark it for `hash_mode`.
pub async fn capable_agent(coordinator: &Coordinator, host_name: &str, hash_mode: i32) -> Agent {
    let (agent, _) = register(coordinator, host_name).await;
    coordinator
        .submit_benchmarks(agent.id, vec![benchmark(hash_mode)])
        .await
        .unwrap();
    agent
}

pub fn benchmark(hash_type_id: i32) -> BenchmarkEntry {
    BenchmarkEntry {
        hash_type_id,
        runtime_ms: 1200,
        hash_speed: 2.5e9,
        device: "RTX 4090".to_string(),
    }
}

pub fn snapshot(processed: i64, total: i64) -> StatusSnapshot {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 7, 30).unwrap();
    StatusSnapshot {
        original_line: "STATUS\t3".to_string(),
        time: now,
        session: "attack".to_string(),
        status: 3,
        target: "hashes.txt".to_string(),
        progress: [processed, total],
        restore_point: processed,
        recovered_hashes: [0, 10],
        recovered_salts: [0, 1],
        rejected: 0,
        time_start: now,
        estimated_stop: now,
        hashcat_guess: Some(GuessSnapshot {
            guess_base: "rockyou.txt".to_string(),
            guess_base_count: total,
            guess_base_offset: processed,
            guess_base_percentage: 0.0,
            guess_mod: None,
            guess_mod_count: 0,
            guess_mod_offset: 0,
            guess_mod_percentage: 0.0,
            guess_mode: 0,
        }),
        device_statuses: Some(vec![DeviceSnapshot {
            device_id: 1,
            device_name: "RTX 4090".to_string(),
            device_type: "GPU".to_string(),
            speed: 1_000_000,
            utilization: 97,
            temperature: 68,
        }]),
    }
}
