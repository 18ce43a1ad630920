//! Health and readiness checks. None of these require authentication.

use std::time::Instant;

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobs2go_core::env_validation::validate_process_env;
use serde::Serialize;

use crate::error_boundary::error_boundary;
use crate::state::AppState;

/// Reported for deployment fields that are not configured.
const UNKNOWN: &str = "unknown";

/// Length of the abbreviated commit SHA.
const SHORT_SHA_LEN: usize = 7;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Round-trip the database, returning the latency in milliseconds.
async fn database_latency(state: &AppState) -> Result<u64, sqlx::Error> {
    let started = Instant::now();
    jobs2go_db::health_check(&state.pool).await?;
    Ok(started.elapsed().as_millis() as u64)
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = jobs2go_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

// ---------------------------------------------------------------------------
// GET /api/health/deployment
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct DeploymentHealth {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub environment: &'static str,
}

/// GET /api/health/deployment
///
/// Confirms the service came up with its state fully wired.
pub async fn deployment_health(State(state): State<AppState>) -> Json<DeploymentHealth> {
    Json(DeploymentHealth {
        status: "ok",
        message: "All required components are available",
        timestamp: now_rfc3339(),
        environment: state.config.stage.as_str(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/health/complete
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct DeploymentInfo {
    pub url: String,
    pub region: String,
    pub commit: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    pub provider: String,
    pub resend: bool,
    pub smtp: bool,
    pub alert_recipients: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    pub sentry: bool,
    pub slack: bool,
    pub persist_events: bool,
    pub buffered_events: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub jwt_secret: bool,
    pub app_url: bool,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub database: &'static str,
    pub email: EmailStatus,
    pub monitoring: MonitoringStatus,
    pub security: SecurityStatus,
}

#[derive(Serialize)]
pub struct EnvironmentReport {
    pub success: bool,
    pub errors: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteHealth {
    pub status: &'static str,
    pub timestamp: String,
    pub response_time: String,
    pub environment: &'static str,
    pub version: &'static str,
    pub deployment: DeploymentInfo,
    pub services: ServiceStatus,
    #[serde(rename = "environment_validation")]
    pub environment_validation: EnvironmentReport,
    /// Seconds since start-up.
    pub uptime: f64,
}

/// GET /api/health/complete
///
/// Full configuration report: deployment metadata, service wiring and the
/// environment validation result. Never cached.
pub async fn complete_health(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let env = validate_process_env();
    let configured = |key: &str| env.resolved.contains_key(key);

    let database = match jobs2go_db::health_check(&state.pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database unreachable during health check");
            "error"
        }
    };

    let config = &state.config;
    let report = CompleteHealth {
        status: "healthy",
        timestamp: now_rfc3339(),
        response_time: format!("{}ms", started.elapsed().as_millis()),
        environment: config.stage.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        deployment: DeploymentInfo {
            url: config.app_url.clone(),
            region: config.deploy_region.clone().unwrap_or_else(|| UNKNOWN.into()),
            commit: config
                .deploy_commit
                .as_deref()
                .map(|sha| sha.chars().take(SHORT_SHA_LEN).collect())
                .unwrap_or_else(|| UNKNOWN.into()),
        },
        services: ServiceStatus {
            database,
            email: EmailStatus {
                provider: state.email.config().provider.clone(),
                resend: state.email.resend_configured(),
                smtp: state.email.smtp_configured(),
                alert_recipients: !config.alert_recipients.is_empty(),
            },
            monitoring: MonitoringStatus {
                sentry: configured("SENTRY_DSN"),
                slack: configured("SLACK_WEBHOOK_URL"),
                persist_events: state.monitoring.config().persist_events,
                buffered_events: state.monitoring.buffered().await,
            },
            security: SecurityStatus {
                jwt_secret: !config.jwt.secret.is_empty(),
                app_url: configured("APP_URL"),
            },
        },
        environment_validation: EnvironmentReport {
            success: env.success,
            errors: env.errors,
        },
        uptime: state.started_at.elapsed().as_secs_f64(),
    };

    (
        [
            (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        Json(report),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /api/monitoring/health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct DatabaseStatus {
    /// `connected` or `error`.
    pub status: &'static str,
    /// Round-trip time in milliseconds; 0 when unreachable.
    pub latency: u64,
}

#[derive(Serialize)]
pub struct MonitoringHealth {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub environment: &'static str,
    pub database: DatabaseStatus,
    /// Whole seconds since start-up.
    pub uptime: u64,
}

/// Time a database round trip. A failure is tracked as a monitoring error by
/// the boundary and reported as `status: "error"`.
async fn check_database(state: &AppState) -> DatabaseStatus {
    error_boundary(
        &state.monitoring,
        "GET /api/monitoring/health",
        async {
            let latency = database_latency(state).await?;
            state
                .monitoring
                .track_database_performance("health_check", latency)
                .await;
            Ok::<_, sqlx::Error>(DatabaseStatus {
                status: "connected",
                latency,
            })
        },
        |err: &sqlx::Error| {
            tracing::warn!(error = %err, "Database health check failed");
            DatabaseStatus {
                status: "error",
                latency: 0,
            }
        },
    )
    .await
}

/// GET /api/monitoring/health
///
/// Always 200; the database section says whether the round trip worked.
pub async fn monitoring_health(State(state): State<AppState>) -> Json<MonitoringHealth> {
    let database = check_database(&state).await;

    Json(MonitoringHealth {
        status: "ok",
        timestamp: now_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.stage.as_str(),
        database,
        uptime: state.started_at.elapsed().as_secs(),
    })
}
