#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use jobs2go_api::auth::jwt::{generate_session_token, JwtConfig};
use jobs2go_api::config::ServerConfig;
use jobs2go_api::permissions::{DbPermissionLoader, InMemoryPermissionCache, PermissionChecker};
use jobs2go_api::router::build_app_router;
use jobs2go_api::state::AppState;
use jobs2go_core::env_validation::Stage;
use jobs2go_core::types::DbId;
use jobs2go_db::repositories::PermissionRepo;
use jobs2go_events::{
    EmailConfig, EmailService, MonitoringConfig, MonitoringService, RecordingNotifier,
};

pub const ADMIN_EMAIL: &str = "admin@jobs2go.app";
pub const VIEWER_EMAIL: &str = "viewer@jobs2go.app";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            session_expiry_mins: 60,
        },
        permission_cache_ttl_secs: 300,
        stage: Stage::Development,
        app_url: "http://jobs2go.test".to_string(),
        alert_recipients: Vec::new(),
        deploy_region: Some("test-region".to_string()),
        deploy_commit: Some("0123456789abcdef".to_string()),
    }
}

/// Build application state over `pool`, returning the recording notifier so
/// tests can assert on broadcast operations.
///
/// Email is left unconfigured, so sends report `false` without touching
/// the network.
pub fn build_test_state(pool: PgPool) -> (AppState, Arc<RecordingNotifier>) {
    let config = test_config();
    let notifier = Arc::new(RecordingNotifier::new());
    let email = Arc::new(EmailService::new(EmailConfig::from_lookup(|_| None)));
    let monitoring = Arc::new(MonitoringService::new(
        MonitoringConfig::default(),
        notifier.clone(),
    ));
    let permissions = Arc::new(PermissionChecker::new(
        Arc::new(InMemoryPermissionCache::new(Duration::from_secs(
            config.permission_cache_ttl_secs,
        ))),
        Arc::new(DbPermissionLoader::new(pool.clone())),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config),
        permissions,
        notifier: notifier.clone(),
        email,
        monitoring,
        started_at: Instant::now(),
    };

    (state, notifier)
}

/// Build the full application router over `state`.
pub fn build_app_with_state(state: AppState) -> Router {
    let config = state.config.clone();
    build_app_router(state, &config)
}

/// Build the full application router over `pool`, returning the recording
/// notifier.
pub fn build_test_app_with_notifier(pool: PgPool) -> (Router, Arc<RecordingNotifier>) {
    let (state, notifier) = build_test_state(pool);
    (build_app_with_state(state), notifier)
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_notifier(pool).0
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Create a user holding the seeded `role` (`admin` or `viewer`).
pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> DbId {
    let user = PermissionRepo::create_user(pool, email)
        .await
        .expect("user creation should succeed");
    let role = PermissionRepo::find_role_by_name(pool, role)
        .await
        .expect("role lookup should succeed")
        .expect("role should be seeded");
    PermissionRepo::assign_role(pool, user.id, role.id)
        .await
        .expect("role assignment should succeed");
    user.id
}

/// Mint a session token the test app will accept.
pub fn token_for(user_id: DbId, email: Option<&str>) -> String {
    generate_session_token(user_id, email, &test_config().jwt).expect("token should encode")
}

/// Seed an admin and return a token for them.
pub async fn admin_token(pool: &PgPool) -> String {
    let id = seed_user(pool, ADMIN_EMAIL, "admin").await;
    token_for(id, Some(ADMIN_EMAIL))
}

/// Seed a read-only viewer and return a token for them.
pub async fn viewer_token(pool: &PgPool) -> String {
    let id = seed_user(pool, VIEWER_EMAIL, "viewer").await;
    token_for(id, Some(VIEWER_EMAIL))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
