//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use cipherswarm_api::config::{LogFormat, ServerConfig};
use cipherswarm_api::router::build_app_router;
use cipherswarm_api::state::AppState;
use cipherswarm_coordinator::{Coordinator, CoordinatorConfig};
use cipherswarm_core::types::DbId;
use cipherswarm_events::EventBus;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const MD5: i32 = 0;

/// Build a test `ServerConfig` with safe defaults and an admin token.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        admin_api_token: Some(ADMIN_TOKEN.to_string()),
        liveness: None,
        device_bucket_secs: 600,
        log_format: LogFormat::Text,
    }
}

/// Build the full application router over `pool`, with the same middleware
/// stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_config(pool, test_config())
}

pub fn build_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let event_bus = Arc::new(EventBus::default());
    let coordinator = Coordinator::new(
        pool.clone(),
        event_bus.clone(),
        CoordinatorConfig {
            device_bucket_secs: config.device_bucket_secs,
            ..CoordinatorConfig::default()
        },
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        coordinator: Arc::new(coordinator),
        event_bus,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Seed project -> hash list -> campaign -> attack and return
/// `(hash_list_id, attack_id)`.
pub async fn seed_attack(pool: &PgPool, hash_mode: i32) -> (DbId, DbId) {
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
    (hash_list_id, attack_id)
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

pub fn registration_body(host: &str) -> Value {
    json!({
        "host_name": host,
        "client_signature": "CipherSwarm Agent/0.5.0",
        "operating_system": "linux",
    })
}

/// Register through the v2 protocol and return `(agent_id, token)`.
pub async fn register_agent(pool: &PgPool, host: &str) -> (DbId, String) {
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/v2/client/agents/register", registration_body(host)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let agent_id = json["data"]["agent_id"].as_i64().unwrap();
    let token = json["data"]["token"].as_str().unwrap().to_string();
    (agent_id, token)
}

/// Register and benchmark `hash_mode` so the agent can be assigned work.
pub async fn capable_agent(pool: &PgPool, host: &str, hash_mode: i32) -> (DbId, String) {
    let (agent_id, token) = register_agent(pool, host).await;
    let app = build_test_app(pool.clone());
    let body = json!([{
        "hash_type_id": hash_mode,
        "runtime_ms": 1000,
        "hash_speed": 1.5e9,
        "device": "RTX 4090",
    }]);
    let response = post_json_auth(app, "/api/v2/client/agents/benchmarks", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    (agent_id, token)
}

/// A well-formed status snapshot reporting `processed` of `total`.
pub fn status_body(processed: i64, total: i64) -> Value {
    json!({
        "original_line": "STATUS\t3",
        "time": "2024-05-01T12:07:30Z",
        "session": "attack-1",
        "status": 3,
        "target": "dump.txt",
        "progress": [processed, total],
        "restore_point": processed,
        "recovered_hashes": [0, 1],
        "recovered_salts": [0, 1],
        "rejected": 0,
        "time_start": "2024-05-01T12:00:00Z",
        "estimated_stop": "2024-05-01T13:00:00Z",
        "hashcat_guess": {
            "guess_base": "rockyou.txt",
            "guess_base_count": 14344384,
            "guess_base_offset": processed,
            "guess_base_percentage": 1.0,
            "guess_mod": null,
            "guess_mod_count": 0,
            "guess_mod_offset": 0,
            "guess_mod_percentage": 0.0,
            "guess_mode": 0,
        },
        "device_statuses": [{
            "device_id": 1,
            "device_name": "RTX 4090",
            "device_type": "GPU",
            "speed": 1000000,
            "utilization": 98,
            "temperature": 64,
        }],
    })
}
