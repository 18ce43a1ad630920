//! Monitoring event vocabulary and thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Database query duration (ms) at which an operation is reported as a warning.
pub const DB_QUERY_WARNING_MS: u64 = 500;

/// Database query duration (ms) at which an operation is reported as critical.
pub const DB_QUERY_CRITICAL_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Error and critical events are alerted immediately.
    pub fn alerts_immediately(self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Performance,
    Error,
    Security,
    Database,
    Business,
    System,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Error => "error",
            Category::Security => "security",
            Category::Database => "database",
            Category::Business => "business",
            Category::System => "system",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observation recorded by the monitoring context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringEvent {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl MonitoringEvent {
    pub fn new(category: Category, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            details: serde_json::Map::new(),
            timestamp: None,
            source: None,
            user_id: None,
            request_id: None,
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Severity for a database operation of the given duration.
pub fn classify_db_duration(duration_ms: u64) -> Severity {
    if duration_ms >= DB_QUERY_CRITICAL_MS {
        Severity::Critical
    } else if duration_ms >= DB_QUERY_WARNING_MS {
        Severity::Warning
    } else {
        Severity::Info
    }
}
