use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jobs2go_core::env_validation::{validate_process_env, Stage};
use jobs2go_events::{EmailConfig, EmailService, MonitoringConfig, MonitoringService, SourceMapNotifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobs2go_api::config::ServerConfig;
use jobs2go_api::error::set_expose_internal_errors;
use jobs2go_api::permissions::{DbPermissionLoader, InMemoryPermissionCache, PermissionChecker};
use jobs2go_api::router::build_app_router;
use jobs2go_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobs2go_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Environment validation ---
    let env = validate_process_env();
    if env.success {
        tracing::info!(keys = env.resolved.len(), "Environment validated");
    } else {
        for error in &env.errors {
            tracing::warn!(%error, "Environment validation error");
        }
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    set_expose_internal_errors(config.stage == Stage::Development);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        stage = config.stage.as_str(),
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = jobs2go_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    jobs2go_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    jobs2go_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Outbound channels ---
    let email = Arc::new(EmailService::new(EmailConfig::from_env()));
    let notifier = Arc::new(SourceMapNotifier::from_env(Arc::clone(&email)));
    tracing::info!(
        provider = %email.config().provider,
        resend = email.resend_configured(),
        smtp = email.smtp_configured(),
        "Email service configured",
    );

    // --- Monitoring ---
    let monitoring = Arc::new(MonitoringService::new(
        MonitoringConfig::from_env(),
        notifier.clone(),
    ));
    let monitoring_handle = monitoring.start(pool.clone());
    tracing::info!("Monitoring flush loop started");

    // --- Permissions ---
    let permissions = Arc::new(PermissionChecker::new(
        Arc::new(InMemoryPermissionCache::new(Duration::from_secs(
            config.permission_cache_ttl_secs,
        ))),
        Arc::new(DbPermissionLoader::new(pool.clone())),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        permissions,
        notifier,
        email,
        monitoring: Arc::clone(&monitoring),
        started_at: Instant::now(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Final flush of buffered monitoring events.
    monitoring.shutdown();
    let flush_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(flush_timeout, monitoring_handle)
        .await
        .is_err()
    {
        tracing::warn!("Monitoring flush did not finish before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
