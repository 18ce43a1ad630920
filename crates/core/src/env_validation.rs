//! Environment-variable schema validation.
//!
//! Checks the known configuration keys for type/format and fills in defaults
//! for optional keys. The result is logged at start-up and reported by the
//! `/api/health/complete` check; it never aborts the process.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidateEmail, ValidateUrl};

/// Expected shape of an environment value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    Text,
    Url,
    Email,
    Number,
    Bool,
}

/// One entry of the environment schema.
#[derive(Debug, Clone, Copy)]
pub struct EnvKey {
    pub name: &'static str,
    pub kind: EnvKind,
    pub default: Option<&'static str>,
}

const fn key(name: &'static str, kind: EnvKind, default: Option<&'static str>) -> EnvKey {
    EnvKey {
        name,
        kind,
        default,
    }
}

/// The known configuration keys.
pub const ENV_SCHEMA: &[EnvKey] = &[
    // Application
    key("APP_URL", EnvKind::Url, Some("http://jobs2go.app")),
    key("APP_ENV", EnvKind::Text, Some("development")),
    key("HOST", EnvKind::Text, Some("0.0.0.0")),
    key("PORT", EnvKind::Number, Some("3000")),
    key("CORS_ORIGINS", EnvKind::Text, Some("http://localhost:3000")),
    key("REQUEST_TIMEOUT_SECS", EnvKind::Number, Some("30")),
    // Database
    key("DATABASE_URL", EnvKind::Text, None),
    // Auth
    key("JWT_SECRET", EnvKind::Text, None),
    key("PERMISSION_CACHE_TTL_SECS", EnvKind::Number, Some("300")),
    // Email
    key("EMAIL_PROVIDER", EnvKind::Text, Some("resend")),
    key("EMAIL_FROM", EnvKind::Email, Some("onboarding@resend.dev")),
    key("EMAIL_FROM_NAME", EnvKind::Text, Some("Jobs2Go")),
    key("EMAIL_REPLY_TO", EnvKind::Email, Some("help@jobs2go.app")),
    key("RESEND_API_KEY", EnvKind::Text, None),
    key("EMAIL_SERVER_HOST", EnvKind::Text, Some("smtp.sendgrid.net")),
    key("EMAIL_SERVER_PORT", EnvKind::Number, Some("587")),
    key("EMAIL_SERVER_USER", EnvKind::Text, Some("apikey")),
    key("EMAIL_SERVER_PASSWORD", EnvKind::Text, None),
    key("EMAIL_SECURE", EnvKind::Bool, None),
    key("ADMIN_EMAIL", EnvKind::Email, None),
    key("ALERT_RECIPIENTS", EnvKind::Text, None),
    // Notifications
    key("SLACK_WEBHOOK_URL", EnvKind::Url, None),
    key("SLACK_DEFAULT_CHANNEL", EnvKind::Text, Some("#alerts")),
    // Monitoring
    key("SENTRY_DSN", EnvKind::Url, None),
    key("MONITORING_FLUSH_INTERVAL_SECS", EnvKind::Number, Some("10")),
    key("MONITORING_PERSIST_EVENTS", EnvKind::Bool, Some("false")),
    // Deployment
    key("DEPLOY_REGION", EnvKind::Text, None),
    key("DEPLOY_COMMIT_SHA", EnvKind::Text, None),
];

/// Result of validating the environment against [`ENV_SCHEMA`].
#[derive(Debug, Clone, Serialize)]
pub struct EnvValidation {
    pub success: bool,
    pub errors: Vec<String>,
    /// Schema keys with their effective values (defaults applied). Not
    /// serialised: values may be secrets.
    #[serde(skip)]
    pub resolved: BTreeMap<String, String>,
}

/// Validate an environment snapshot against [`ENV_SCHEMA`].
///
/// Empty values are treated as unset. Unknown keys are ignored.
pub fn validate_env<I, K, V>(vars: I) -> EnvValidation
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let env: BTreeMap<String, String> = vars
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(_, v)| !v.is_empty())
        .collect();

    let mut errors = Vec::new();
    let mut resolved = BTreeMap::new();

    for entry in ENV_SCHEMA {
        let value = match env.get(entry.name) {
            Some(v) => v.clone(),
            None => match entry.default {
                Some(d) => d.to_string(),
                None => continue,
            },
        };

        if let Some(reason) = check_kind(entry.kind, &value) {
            errors.push(format!("{}: {reason}", entry.name));
        }
        resolved.insert(entry.name.to_string(), value);
    }

    EnvValidation {
        success: errors.is_empty(),
        errors,
        resolved,
    }
}

/// Validate the current process environment.
pub fn validate_process_env() -> EnvValidation {
    validate_env(std::env::vars())
}

fn check_kind(kind: EnvKind, value: &String) -> Option<&'static str> {
    match kind {
        EnvKind::Text => None,
        EnvKind::Url => (!value.validate_url()).then_some("Invalid url"),
        EnvKind::Email => (!value.validate_email()).then_some("Invalid email"),
        EnvKind::Number => value.parse::<f64>().is_err().then_some("Expected number"),
        EnvKind::Bool => (!matches!(value.as_str(), "true" | "false"))
            .then_some("Expected \"true\" or \"false\""),
    }
}

/// Mask a configuration value for logging: first four characters then `...`.
pub fn mask_value(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}...")
}

/// Deployment stage derived from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Development,
    Staging,
    Production,
}

impl Stage {
    pub fn from_app_env(value: Option<&str>) -> Self {
        match value {
            Some("development") | Some("dev") | Some("test") => Stage::Development,
            Some("staging") | Some("preview") => Stage::Staging,
            _ => Stage::Production,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Development => "development",
            Stage::Staging => "staging",
            Stage::Production => "production",
        }
    }
}
