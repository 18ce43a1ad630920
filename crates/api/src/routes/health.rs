//! Route definitions for health checks.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Liveness route (intended for root level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Checks mounted at `/api/health`.
///
/// ```text
/// GET /deployment  -> deployment_health
/// GET /complete    -> complete_health
/// ```
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/deployment", get(health::deployment_health))
        .route("/complete", get(health::complete_health))
}

/// Checks mounted at `/api/monitoring`.
///
/// ```text
/// GET /health  -> monitoring_health
/// ```
pub fn monitoring_router() -> Router<AppState> {
    Router::new().route("/health", get(health::monitoring_health))
}
