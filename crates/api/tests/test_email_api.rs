//! HTTP-level integration tests for the email delivery check.
//!
//! The test app has no email transport configured, so every send reports
//! `false` without leaving the process.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, get_auth, post_json_auth, viewer_token};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_email_check_reports_results(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/test/email?email=ops@jobs2go.app", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Email test completed");
    assert_eq!(json["results"]["emailSent"], false);
    assert_eq!(json["results"]["alertSent"], false);
    assert_eq!(json["results"]["provider"], "resend");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_email_check_rejects_malformed_address(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/test/email?email=not-an-address", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_send_requires_all_fields(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/test/email",
        json!({ "to": "ops@jobs2go.app", "subject": "Hi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required fields: to, subject, message"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_send_reports_delivery_failure(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/test/email",
        json!({
            "to": "ops@jobs2go.app",
            "subject": "Hello",
            "message": "<b>hi</b>",
            "type": "alert",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Email sending failed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_email_check_requires_admin_access(pool: PgPool) {
    let token = viewer_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/test/email", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
