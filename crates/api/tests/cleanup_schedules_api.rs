//! HTTP-level integration tests for cleanup schedule endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, delete_auth, get_auth, post_json_auth, put_json_auth, viewer_token,
};
use jobs2go_core::types::DbId;
use jobs2go_events::OperationKind;
use serde_json::json;
use sqlx::PgPool;

const BASE: &str = "/api/admin/source-maps/cleanup-schedules";

fn schedule_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "retentionDays": 30,
        "minVersionsToKeep": 5,
        "cronSchedule": "0 2 * * *",
        "notificationChannels": ["email"],
    })
}

async fn create_schedule(pool: &PgPool, token: &str, name: &str) -> DbId {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, BASE, schedule_body(name), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_schedule_returns_201(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (app, notifier) = common::build_test_app_with_notifier(pool);

    let response = post_json_auth(app, BASE, schedule_body("Nightly"), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["name"], "Nightly");
    assert_eq!(data["description"], "");
    assert_eq!(data["cronSchedule"], "0 2 * * *");
    assert_eq!(data["createdBy"], common::ADMIN_EMAIL);
    assert_eq!(data["isActive"], true);
    assert_eq!(notifier.kinds(), vec![OperationKind::ScheduleCreated]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_invalid_schedule_returns_400(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "ab",
        "retentionDays": 0,
        "minVersionsToKeep": 5,
        "cronSchedule": "0 2 * * *",
        "notificationChannels": ["pager"],
    });
    let response = post_json_auth(app, BASE, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_with_unknown_template_returns_400(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let mut body = schedule_body("Linked");
    body["templateId"] = json!(999999);
    let response = post_json_auth(app, BASE, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_get_update_delete(pool: PgPool) {
    let token = admin_token(&pool).await;
    let id = create_schedule(&pool, &token, "Nightly").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, BASE, &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("{BASE}/{id}"),
        json!({ "isActive": false, "retentionDays": 14 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["isActive"], false);
    assert_eq!(json["data"]["retentionDays"], 14);
    assert_eq!(json["data"]["name"], "Nightly");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("{BASE}/{id}"),
        json!({ "cronSchedule": "daily" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (app, notifier) = common::build_test_app_with_notifier(pool.clone());
    let response = delete_auth(app, &format!("{BASE}/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(notifier.kinds(), vec![OperationKind::ScheduleDeleted]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{BASE}/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_null_template_id_detaches_schedule(pool: PgPool) {
    let token = admin_token(&pool).await;
    let template_id: DbId = sqlx::query_scalar(
        "SELECT id FROM source_map_cleanup_templates WHERE name = 'Daily Maintenance'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let mut body = schedule_body("Linked");
    body["templateId"] = json!(template_id);
    let response = post_json_auth(app, BASE, body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Omitting the field keeps the link.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &format!("{BASE}/{id}"), json!({ "retentionDays": 7 }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["templateId"], template_id);

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &format!("{BASE}/{id}"), json!({ "templateId": null }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["templateId"].is_null());
    assert_eq!(json["data"]["retentionDays"], 7);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_schedule_returns_404(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("{BASE}/999999"),
        json!({ "name": "Ghost" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("{BASE}/999999"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_cannot_create_or_delete(pool: PgPool) {
    let admin = admin_token(&pool).await;
    let id = create_schedule(&pool, &admin, "Nightly").await;
    let viewer = viewer_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("{BASE}/{id}"), &viewer).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, BASE, schedule_body("Other"), &viewer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("{BASE}/{id}"), &viewer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
