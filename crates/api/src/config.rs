use jobs2go_core::env_validation::Stage;

use crate::auth::jwt::JwtConfig;

/// Default permission cache lifetime in seconds.
const DEFAULT_PERMISSION_CACHE_TTL_SECS: u64 = 300;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long post-shutdown cleanup may take, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT verification settings.
    pub jwt: JwtConfig,
    /// Lifetime of a cached permission set (default: `300`).
    pub permission_cache_ttl_secs: u64,
    /// Deployment stage from `APP_ENV`.
    pub stage: Stage,
    /// Public base URL, recorded as `metadata.source` on exports.
    pub app_url: String,
    /// Default recipients for test alerts, from comma-separated `ALERT_RECIPIENTS`.
    pub alert_recipients: Vec<String>,
    /// Deployment region reported by the health checks.
    pub deploy_region: Option<String>,
    /// Deployed commit SHA reported by the health checks.
    pub deploy_commit: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                    |
    /// | `PERMISSION_CACHE_TTL_SECS` | `300`                   |
    /// | `APP_ENV`                   | `production`            |
    /// | `APP_URL`                   | `http://jobs2go.app`    |
    /// | `ALERT_RECIPIENTS`          | -                       |
    /// | `DEPLOY_REGION`             | -                       |
    /// | `DEPLOY_COMMIT_SHA`         | -                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins =
            parse_list(&std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()));

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let permission_cache_ttl_secs: u64 = std::env::var("PERMISSION_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_PERMISSION_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("PERMISSION_CACHE_TTL_SECS must be a valid u64");

        let stage = Stage::from_app_env(std::env::var("APP_ENV").ok().as_deref());

        let app_url = std::env::var("APP_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "http://jobs2go.app".into());

        let alert_recipients = parse_list(&std::env::var("ALERT_RECIPIENTS").unwrap_or_default());
        let deploy_region = non_empty_var("DEPLOY_REGION");
        let deploy_commit = non_empty_var("DEPLOY_COMMIT_SHA");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            permission_cache_ttl_secs,
            stage,
            app_url,
            alert_recipients,
            deploy_region,
            deploy_commit,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
