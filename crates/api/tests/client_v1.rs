//! Integration tests for the legacy v1 agent protocol.
//!
//! These pin the status codes deployed agents rely on.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, body_text, get_auth, post_auth, post_json, post_json_auth, status_body, MD5,
};
use serde_json::json;
use sqlx::PgPool;

const V1: &str = "/api/v1/client";

/// Register a benchmarked agent and pull one task through `/tasks/new`.
async fn running_task(pool: &PgPool) -> (i64, String, i64, i64) {
    let (hash_list_id, attack_id) = common::seed_attack(pool, MD5).await;
    let task_id = common::insert_pending_task(pool, attack_id, 1_000).await;
    let (agent_id, token) = common::capable_agent(pool, "rig-01", MD5).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{V1}/tasks/new"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], task_id);

    (agent_id, token, task_id, hash_list_id)
}

// ---------------------------------------------------------------------------
// Registration and identity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_then_authenticate(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("{V1}/agents/register"),
        common::registration_body("rig-01"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let token = json["token"].as_str().unwrap().to_string();
    let agent_id = json["agent_id"].as_i64().unwrap();
    assert_eq!(json["agent"]["state"], "pending");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{V1}/authenticate"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["agent_id"], agent_id);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{V1}/authenticate"), "csa_1_forged").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_with_blank_host_is_422(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("{V1}/agents/register"),
        common::registration_body("   "),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn heartbeat_without_body_is_204(pool: PgPool) {
    let (agent_id, token) = common::register_agent(&pool, "rig-01").await;

    let app = common::build_test_app(pool);
    let response = post_auth(app, &format!("{V1}/agents/{agent_id}/heartbeat"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn agent_routes_hide_other_agents(pool: PgPool) {
    let (_, token) = common::register_agent(&pool, "rig-01").await;
    let (other_id, _) = common::register_agent(&pool, "rig-02").await;

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("{V1}/agents/{other_id}/heartbeat"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Record not found");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{V1}/agents/{other_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_benchmark_activates_agent(pool: PgPool) {
    let (agent_id, token) = common::register_agent(&pool, "rig-01").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "hashcat_benchmarks": [
            { "hash_type_id": 0, "runtime_ms": 1000, "hash_speed": 2.0e9, "device": "RTX 4090" },
            { "hash_type_id": 1000, "runtime_ms": 1000, "hash_speed": 3.0e9, "device": "RTX 4090" },
        ]
    });
    let response = post_json_auth(
        app,
        &format!("{V1}/agents/{agent_id}/submit_benchmark"),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{V1}/agents/{agent_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["state"], "active");
}

// ---------------------------------------------------------------------------
// Task flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_task_is_204_when_nothing_is_available(pool: PgPool) {
    let (_, token) = common::capable_agent(&pool, "rig-01", MD5).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{V1}/tasks/new"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_task_flow(pool: PgPool) {
    let (_, token, task_id, hash_list_id) = running_task(&pool).await;
    common::add_hash(&pool, hash_list_id, "5f4dcc3b5aa765d61d8327deb882cf99").await;

    // Accepting the task `/tasks/new` already started is harmless.
    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("{V1}/tasks/{task_id}/accept_task"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_status"),
        status_body(250, 1_000),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_crack"),
        json!({ "hash": "5f4dcc3b5aa765d61d8327deb882cf99", "plain_text": "password" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Cracked hash submitted");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{V1}/tasks/{task_id}/get_zaps"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("5f4dcc3b5aa765d61d8327deb882cf99:password"));

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("{V1}/tasks/{task_id}/exhausted"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // A late status report on the finished task is stale.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_status"),
        status_body(1_000, 1_000),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Terminal tasks refuse further transitions with 422.
    let app = common::build_test_app(pool);
    let response = post_auth(app, &format!("{V1}/tasks/{task_id}/abandon"), &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Task already completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_task_looks_missing(pool: PgPool) {
    let (_, _, task_id, _) = running_task(&pool).await;
    let (_, intruder) = common::register_agent(&pool, "rig-99").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{V1}/tasks/{task_id}"), &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = post_auth(app, &format!("{V1}/tasks/{task_id}/abandon"), &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Record not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_status_is_422_with_reason(pool: PgPool) {
    let (_, token, task_id, _) = running_task(&pool).await;

    let mut body = status_body(100, 1_000);
    body.as_object_mut().unwrap().remove("device_statuses");

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_status"),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    let reason = json["error"].as_str().unwrap();
    assert!(reason.contains("Device Statuses not found"), "{reason}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn paused_task_status_is_410(pool: PgPool) {
    let (_, token, task_id, _) = running_task(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_auth(
        app,
        &format!("/api/v1/admin/tasks/{task_id}/pause"),
        common::ADMIN_TOKEN,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_status"),
        status_body(300, 1_000),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::GONE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn crack_for_unknown_hash_is_404(pool: PgPool) {
    let (_, token, task_id, _) = running_task(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/submit_crack"),
        json!({ "hash": "not-in-the-list", "plain_text": "guess" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Hash not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_on_paused_task_is_409(pool: PgPool) {
    let (_, token, task_id, _) = running_task(&pool).await;

    let app = common::build_test_app(pool.clone());
    post_auth(
        app,
        &format!("/api/v1/admin/tasks/{task_id}/pause"),
        common::ADMIN_TOKEN,
    )
    .await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("{V1}/tasks/{task_id}/progress"),
        json!({ "progress_percent": 40.0, "keyspace_processed": 400 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Task not running");
}
