//! Persisted monitoring events.

use jobs2go_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `monitoring_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMonitoringEvent {
    pub id: DbId,
    pub category: String,
    pub severity: String,
    pub message: String,
    pub details: serde_json::Value,
    pub source: Option<String>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// Per-severity event count over a time window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
}
