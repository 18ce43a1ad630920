//! Repository for the `monitoring_events` table.

use jobs2go_core::monitoring::MonitoringEvent;
use jobs2go_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::monitoring_event::{SeverityCount, StoredMonitoringEvent};

/// Column list for monitoring_events queries.
const COLUMNS: &str = "\
    id, category, severity, message, details, source, user_id, request_id, \
    occurred_at, created_at";

/// Provides batch inserts and summary reads for monitoring events.
pub struct MonitoringEventRepo;

impl MonitoringEventRepo {
    /// Insert a batch of events in one transaction.
    ///
    /// Events without a timestamp are stamped with `fallback_time`.
    pub async fn insert_batch(
        pool: &PgPool,
        events: &[MonitoringEvent],
        fallback_time: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for event in events {
            let result = sqlx::query(
                "INSERT INTO monitoring_events \
                     (category, severity, message, details, source, user_id, request_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.category.as_str())
            .bind(event.severity.as_str())
            .bind(&event.message)
            .bind(serde_json::Value::Object(event.details.clone()))
            .bind(&event.source)
            .bind(&event.user_id)
            .bind(&event.request_id)
            .bind(event.timestamp.unwrap_or(fallback_time))
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(count = inserted, "Persisted monitoring events");
        Ok(inserted)
    }

    /// Most recent events, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<StoredMonitoringEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM monitoring_events \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, StoredMonitoringEvent>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Event counts per severity since the given instant.
    pub async fn count_by_severity_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<SeverityCount>, sqlx::Error> {
        sqlx::query_as::<_, SeverityCount>(
            "SELECT severity, COUNT(*) AS count FROM monitoring_events \
             WHERE occurred_at >= $1 \
             GROUP BY severity \
             ORDER BY severity",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
