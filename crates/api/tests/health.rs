//! Integration tests for the health checks and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use jobs2go_events::OperationKind;
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["dbHealthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deployment_check_reports_environment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/health/deployment").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["environment"], "development");
    assert!(json["timestamp"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn complete_check_reports_services_and_disables_caching(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/health/complete").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(response.headers()["pragma"], "no-cache");

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["responseTime"].as_str().unwrap().ends_with("ms"));
    assert_eq!(json["deployment"]["url"], "http://jobs2go.test");
    assert_eq!(json["deployment"]["region"], "test-region");
    assert_eq!(json["deployment"]["commit"], "0123456");
    assert_eq!(json["services"]["database"], "connected");
    assert_eq!(json["services"]["email"]["resend"], false);
    assert_eq!(json["services"]["email"]["alertRecipients"], false);
    assert_eq!(json["services"]["security"]["jwtSecret"], true);
    assert!(json["environment_validation"]["success"].is_boolean());
    assert!(json["environment_validation"]["errors"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn monitoring_health_reports_database_latency(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/monitoring/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"]["status"], "connected");
    assert!(json["database"]["latency"].is_u64());
    assert!(json["uptime"].is_u64());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn monitoring_health_tracks_database_failure(pool: PgPool) {
    let (app, notifier) = common::build_test_app_with_notifier(pool.clone());
    pool.close().await;

    let response = get(app, "/api/monitoring/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"]["status"], "error");
    assert_eq!(json["database"]["latency"], 0);

    // The alert for the tracked error is delivered on a spawned task.
    for _ in 0..50 {
        if notifier.kinds().contains(&OperationKind::MonitoringAlert) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("database failure was not raised as a monitoring alert");
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_returns_correct_headers(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/admin/source-maps/templates")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:3000");
}

// ---------------------------------------------------------------------------
// Test: cross-origin responses expose the request ID to the browser
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_exposes_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exposed = response
        .headers()
        .get("access-control-expose-headers")
        .expect("Missing Access-Control-Expose-Headers header")
        .to_str()
        .unwrap();
    assert!(exposed.contains("x-request-id"));
}
