//! Monitoring context.
//!
//! [`MonitoringService`] is constructed once at start-up and shared through
//! `Arc`. It buffers [`MonitoringEvent`]s, alerts immediately on error and
//! critical events, and flushes the buffer on a fixed interval. With
//! persistence enabled the flush writes to `monitoring_events`; otherwise the
//! drained events are only logged.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use jobs2go_core::monitoring::{classify_db_duration, Category, MonitoringEvent, Severity};
use jobs2go_db::repositories::MonitoringEventRepo;
use jobs2go_db::DbPool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notifier::{Notifier, OperationEvent, OperationKind, OperationStatus};

/// Default flush interval.
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Oldest events are dropped once the buffer holds this many.
pub const MAX_BUFFERED_EVENTS: usize = 1000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub flush_interval: Duration,
    pub persist_events: bool,
    /// Stamped on events that carry no `source`.
    pub source: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            persist_events: false,
            source: None,
        }
    }
}

impl MonitoringConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                         | Default                      |
    /// |----------------------------------|------------------------------|
    /// | `MONITORING_FLUSH_INTERVAL_SECS` | `10`                         |
    /// | `MONITORING_PERSIST_EVENTS`      | `true` when `APP_ENV=production` |
    /// | `DEPLOY_REGION`                  | -                            |
    pub fn from_env() -> Self {
        let flush_interval = std::env::var("MONITORING_FLUSH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FLUSH_INTERVAL);
        let persist_events = match std::env::var("MONITORING_PERSIST_EVENTS").ok().as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => std::env::var("APP_ENV").ok().as_deref() == Some("production"),
        };
        Self {
            flush_interval,
            persist_events,
            source: std::env::var("DEPLOY_REGION").ok().filter(|v| !v.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// MonitoringService
// ---------------------------------------------------------------------------

/// Buffered event sink with alerting and a periodic flush loop.
pub struct MonitoringService {
    config: MonitoringConfig,
    notifier: Arc<dyn Notifier>,
    buffer: Mutex<VecDeque<MonitoringEvent>>,
    cancel: CancellationToken,
}

impl MonitoringService {
    pub fn new(config: MonitoringConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            buffer: Mutex::new(VecDeque::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Number of events waiting for the next flush.
    pub async fn buffered(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Record an event.
    ///
    /// Missing timestamp and source are filled in. Error and critical events
    /// also trigger an alert on a spawned task, so this never waits on
    /// delivery.
    pub async fn track_event(&self, mut event: MonitoringEvent) {
        if event.timestamp.is_none() {
            event.timestamp = Some(chrono::Utc::now());
        }
        if event.source.is_none() {
            event.source = self.config.source.clone();
        }

        match event.severity {
            Severity::Info => {
                tracing::debug!(category = %event.category, message = %event.message, "Monitoring event")
            }
            Severity::Warning => {
                tracing::warn!(category = %event.category, message = %event.message, "Monitoring event")
            }
            Severity::Error | Severity::Critical => tracing::error!(
                category = %event.category,
                severity = %event.severity,
                message = %event.message,
                "Monitoring event"
            ),
        }

        if event.severity.alerts_immediately() {
            let alert = alert_for(&event);
            let notifier = Arc::clone(&self.notifier);
            tokio::spawn(async move { notifier.notify(alert).await });
        }

        let mut buffer = self.buffer.lock().await;
        if buffer.len() >= MAX_BUFFERED_EVENTS {
            buffer.pop_front();
            tracing::warn!("Monitoring buffer full, dropping oldest event");
        }
        buffer.push_back(event);
    }

    /// Record an error with optional context.
    pub async fn track_error(
        &self,
        message: impl Into<String>,
        details: serde_json::Map<String, serde_json::Value>,
    ) {
        let mut event = MonitoringEvent::new(Category::Error, Severity::Error, message);
        event.details = details;
        self.track_event(event).await;
    }

    /// Record a database operation's duration. Slow operations become
    /// warnings or critical events.
    pub async fn track_database_performance(&self, operation: &str, duration_ms: u64) {
        let severity = classify_db_duration(duration_ms);
        let event = MonitoringEvent::new(
            Category::Database,
            severity,
            format!("Database operation {operation} took {duration_ms}ms"),
        )
        .with_detail("operation", operation)
        .with_detail("durationMs", duration_ms);
        self.track_event(event).await;
    }

    /// Record a business-level occurrence.
    pub async fn track_business_event(
        &self,
        name: &str,
        details: serde_json::Map<String, serde_json::Value>,
    ) {
        let mut event =
            MonitoringEvent::new(Category::Business, Severity::Info, format!("Business event: {name}"));
        event.details = details;
        self.track_event(event).await;
    }

    /// Record a security-relevant occurrence.
    pub async fn track_security_event(
        &self,
        message: impl Into<String>,
        severity: Severity,
        user_id: Option<String>,
    ) {
        let mut event = MonitoringEvent::new(Category::Security, severity, message);
        event.user_id = user_id;
        self.track_event(event).await;
    }

    /// Drain the buffer.
    ///
    /// With persistence enabled the events are written to the database; a
    /// failed write puts them back at the front of the buffer. Returns the
    /// number of events drained.
    pub async fn flush(&self, pool: &DbPool) -> usize {
        let drained: Vec<MonitoringEvent> = {
            let mut buffer = self.buffer.lock().await;
            buffer.drain(..).collect()
        };
        if drained.is_empty() {
            return 0;
        }

        if !self.config.persist_events {
            for event in &drained {
                tracing::debug!(
                    category = %event.category,
                    severity = %event.severity,
                    message = %event.message,
                    "Flushed monitoring event"
                );
            }
            return drained.len();
        }

        match MonitoringEventRepo::insert_batch(pool, &drained, chrono::Utc::now()).await {
            Ok(_) => drained.len(),
            Err(e) => {
                tracing::error!(error = %e, count = drained.len(), "Failed to flush monitoring events");
                let mut buffer = self.buffer.lock().await;
                for event in drained.into_iter().rev() {
                    buffer.push_front(event);
                }
                while buffer.len() > MAX_BUFFERED_EVENTS {
                    buffer.pop_back();
                }
                0
            }
        }
    }

    /// Spawn the periodic flush loop. It runs until [`shutdown`] is called
    /// and performs a final flush on the way out.
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn start(self: &Arc<Self>, pool: DbPool) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(service.config.flush_interval);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = service.cancel.cancelled() => {
                        let flushed = service.flush(&pool).await;
                        tracing::info!(flushed, "Monitoring service stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        service.flush(&pool).await;
                    }
                }
            }
        })
    }

    /// Stop the flush loop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Notification sent for an error or critical monitoring event.
fn alert_for(event: &MonitoringEvent) -> OperationEvent {
    let status = match event.severity {
        Severity::Critical | Severity::Error => OperationStatus::Failure,
        Severity::Warning => OperationStatus::Warning,
        Severity::Info => OperationStatus::Success,
    };
    let mut alert = OperationEvent::new(OperationKind::MonitoringAlert, status, event.message.clone())
        .with_detail("category", event.category.as_str())
        .with_detail("severity", event.severity.as_str());
    for (key, value) in &event.details {
        alert.details.insert(key.clone(), value.clone());
    }
    if let Some(request_id) = &event.request_id {
        alert = alert.with_operation_id(request_id.clone());
    }
    alert
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::RecordingNotifier;

    fn service(notifier: Arc<RecordingNotifier>) -> MonitoringService {
        MonitoringService::new(MonitoringConfig::default(), notifier)
    }

    #[tokio::test]
    async fn info_events_are_buffered_without_alert() {
        let notifier = Arc::new(RecordingNotifier::new());
        let monitoring = service(Arc::clone(&notifier));

        monitoring
            .track_business_event("template_created", serde_json::Map::new())
            .await;
        tokio::task::yield_now().await;

        assert_eq!(monitoring.buffered().await, 1);
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn error_events_alert_immediately() {
        let notifier = Arc::new(RecordingNotifier::new());
        let monitoring = service(Arc::clone(&notifier));

        monitoring.track_error("boom", serde_json::Map::new()).await;
        // Let the spawned alert task run.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, OperationKind::MonitoringAlert);
        assert_eq!(events[0].status, OperationStatus::Failure);
        assert_eq!(events[0].details["severity"], "error");
    }

    #[tokio::test]
    async fn slow_queries_escalate() {
        let notifier = Arc::new(RecordingNotifier::new());
        let monitoring = service(Arc::clone(&notifier));

        monitoring.track_database_performance("list_templates", 750).await;
        monitoring.track_database_performance("list_templates", 2500).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Only the critical one alerts.
        assert_eq!(notifier.events().len(), 1);
        assert_eq!(monitoring.buffered().await, 2);
    }

    #[tokio::test]
    async fn timestamp_and_source_are_filled_in() {
        let notifier = Arc::new(RecordingNotifier::new());
        let config = MonitoringConfig {
            source: Some("eu-west-1".into()),
            ..Default::default()
        };
        let monitoring = MonitoringService::new(config, notifier);

        monitoring
            .track_event(MonitoringEvent::new(Category::System, Severity::Info, "boot"))
            .await;

        let buffer = monitoring.buffer.lock().await;
        assert!(buffer[0].timestamp.is_some());
        assert_eq!(buffer[0].source.as_deref(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn buffer_is_bounded() {
        let notifier = Arc::new(RecordingNotifier::new());
        let monitoring = service(notifier);
        for i in 0..(MAX_BUFFERED_EVENTS + 5) {
            monitoring
                .track_event(MonitoringEvent::new(Category::System, Severity::Info, format!("e{i}")))
                .await;
        }
        let buffer = monitoring.buffer.lock().await;
        assert_eq!(buffer.len(), MAX_BUFFERED_EVENTS);
        assert_eq!(buffer[0].message, "e5");
    }
}
