//! Source-map operation notifications.
//!
//! A [`Notifier`] is a best-effort side channel: `notify` never fails and
//! never panics, so callers can await it after committing their primary work
//! without error handling. [`SourceMapNotifier`] fans an event out to Slack
//! and email concurrently and logs any channel that fails.

use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use jobs2go_core::types::Timestamp;
use regex::Regex;
use serde::Serialize;

use crate::delivery::email::{EmailMessage, EmailService};
use crate::delivery::slack::{SlackAttachment, SlackConfig, SlackDelivery, SlackMessage};

/// Footer attached to every Slack notification.
pub const SLACK_FOOTER: &str = "Source Map Management System";

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    TemplateCreated,
    TemplateUpdated,
    TemplateDeleted,
    TemplateDuplicated,
    TemplateVersionRestored,
    TemplatesImported,
    ScheduleCreated,
    ScheduleUpdated,
    ScheduleDeleted,
    MonitoringAlert,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::TemplateCreated => "template_created",
            OperationKind::TemplateUpdated => "template_updated",
            OperationKind::TemplateDeleted => "template_deleted",
            OperationKind::TemplateDuplicated => "template_duplicated",
            OperationKind::TemplateVersionRestored => "template_version_restored",
            OperationKind::TemplatesImported => "templates_imported",
            OperationKind::ScheduleCreated => "schedule_created",
            OperationKind::ScheduleUpdated => "schedule_updated",
            OperationKind::ScheduleDeleted => "schedule_deleted",
            OperationKind::MonitoringAlert => "monitoring_alert",
        }
    }
}

/// How it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Warning,
    Failure,
}

impl OperationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Warning => "warning",
            OperationStatus::Failure => "failure",
        }
    }

    /// Slack attachment colour.
    pub fn color(self) -> &'static str {
        match self {
            OperationStatus::Success => "#36a64f",
            OperationStatus::Warning => "#f2c744",
            OperationStatus::Failure => "#d63031",
        }
    }
}

/// An operation outcome to broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEvent {
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub message: String,
    pub details: serde_json::Map<String, serde_json::Value>,
    pub timestamp: Timestamp,
    pub operation_id: Option<String>,
}

impl OperationEvent {
    pub fn new(kind: OperationKind, status: OperationStatus, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            details: serde_json::Map::new(),
            timestamp: chrono::Utc::now(),
            operation_id: None,
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// `Source Map {Kind} {Status}` with each word capitalised.
    pub fn title(&self) -> String {
        format!(
            "Source Map {} {}",
            title_case(self.kind.as_str()),
            title_case(self.status.as_str())
        )
    }

    /// Markdown-ish body shared by Slack and email.
    pub fn body(&self) -> String {
        let mut body = format!("*{}*\n\n{}", self.title(), self.message);

        if !self.details.is_empty() {
            body.push_str("\n\n*Details:*\n");
            for (key, value) in &self.details {
                body.push_str(&format!("• {key}: {value}\n"));
            }
        }
        if let Some(id) = &self.operation_id {
            body.push_str(&format!("\n*Operation ID:* {id}"));
        }
        body.push_str(&format!(
            "\n*Time:* {}",
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        ));
        body
    }
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Drop `*bold*` markers.
pub fn to_plain_text(body: &str) -> String {
    BOLD_RE.replace_all(body, "$1").into_owned()
}

/// Turn `*bold*` into `<strong>` and newlines into `<br>`.
pub fn to_html(body: &str) -> String {
    BOLD_RE
        .replace_all(body, "<strong>$1</strong>")
        .replace('\n', "<br>")
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Best-effort broadcast of operation outcomes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the event to every configured channel. Never fails; channel
    /// errors are logged.
    async fn notify(&self, event: OperationEvent);
}

/// Email routing for notifications: sender plus admin recipient.
struct EmailRoute {
    service: Arc<EmailService>,
    from: String,
    to: String,
}

/// Production notifier: Slack webhook plus admin email.
pub struct SourceMapNotifier {
    slack: Option<SlackDelivery>,
    email: Option<EmailRoute>,
}

impl SourceMapNotifier {
    /// Build from explicit parts. A channel is disabled when its part is
    /// `None`.
    pub fn new(
        slack: Option<SlackConfig>,
        email: Option<(Arc<EmailService>, String, String)>,
    ) -> Self {
        Self {
            slack: slack.map(SlackDelivery::new),
            email: email.map(|(service, from, to)| EmailRoute { service, from, to }),
        }
    }

    /// Build from the environment.
    ///
    /// Slack is enabled by `SLACK_WEBHOOK_URL`; email requires both
    /// `EMAIL_FROM` and `ADMIN_EMAIL`.
    pub fn from_env(email_service: Arc<EmailService>) -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let email = match (var("EMAIL_FROM"), var("ADMIN_EMAIL")) {
            (Some(from), Some(to)) => Some((email_service, from, to)),
            _ => None,
        };
        Self::new(SlackConfig::from_env(), email)
    }

    async fn send_slack(&self, title: &str, body: &str, status: OperationStatus) {
        let Some(slack) = &self.slack else {
            return;
        };
        let message = SlackMessage::with_attachment(
            title,
            SlackAttachment {
                color: status.color().to_string(),
                title: None,
                text: body.to_string(),
                footer: Some(SLACK_FOOTER.to_string()),
            },
        );
        if let Err(e) = slack.send(&message).await {
            tracing::error!(error = %e, "Failed to send Slack notification");
        }
    }

    async fn send_email(&self, title: &str, body: &str, status: OperationStatus) {
        let Some(route) = &self.email else {
            return;
        };
        let message = EmailMessage {
            to: vec![route.to.clone()],
            subject: format!("[{}] {title}", status.as_str().to_uppercase()),
            text: Some(to_plain_text(body)),
            html: Some(to_html(body)),
            from: Some(route.from.clone()),
        };
        if !route.service.send_email(&message).await {
            tracing::error!("Failed to send email notification");
        }
    }
}

#[async_trait]
impl Notifier for SourceMapNotifier {
    async fn notify(&self, event: OperationEvent) {
        let title = event.title();
        let body = event.body();

        tokio::join!(
            self.send_slack(&title, &body, event.status),
            self.send_email(&title, &body, event.status),
        );

        tracing::info!(
            operation = event.kind.as_str(),
            status = event.status.as_str(),
            "Source map operation notification sent"
        );
    }
}

/// Notifier that records events in memory instead of delivering them.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<OperationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<OperationEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: OperationEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> OperationEvent {
        let mut event = OperationEvent::new(
            OperationKind::TemplateCreated,
            OperationStatus::Success,
            "Template \"T1\" created",
        )
        .with_detail("templateId", 7)
        .with_operation_id("op-1");
        event.timestamp = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        event
    }

    #[test]
    fn title_capitalises_each_word() {
        assert_eq!(sample().title(), "Source Map Template Created Success");
        let deleted =
            OperationEvent::new(OperationKind::ScheduleDeleted, OperationStatus::Failure, "");
        assert_eq!(deleted.title(), "Source Map Schedule Deleted Failure");
    }

    #[test]
    fn body_layout() {
        let body = sample().body();
        assert_eq!(
            body,
            "*Source Map Template Created Success*\n\nTemplate \"T1\" created\n\n\
             *Details:*\n• templateId: 7\n\n*Operation ID:* op-1\n\
             *Time:* 2026-03-01T12:00:00.000Z"
        );
    }

    #[test]
    fn body_without_details_or_id() {
        let mut event =
            OperationEvent::new(OperationKind::TemplatesImported, OperationStatus::Warning, "slow");
        event.timestamp = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            event.body(),
            "*Source Map Templates Imported Warning*\n\nslow\n*Time:* 2026-03-01T00:00:00.000Z"
        );
    }

    #[test]
    fn markup_conversions() {
        let body = "*Title*\n\nplain *bold*";
        assert_eq!(to_plain_text(body), "Title\n\nplain bold");
        assert_eq!(
            to_html(body),
            "<strong>Title</strong><br><br>plain <strong>bold</strong>"
        );
    }

    #[test]
    fn status_colours() {
        assert_eq!(OperationStatus::Success.color(), "#36a64f");
        assert_eq!(OperationStatus::Warning.color(), "#f2c744");
        assert_eq!(OperationStatus::Failure.color(), "#d63031");
    }

    #[tokio::test]
    async fn notifier_without_channels_is_a_no_op() {
        let notifier = SourceMapNotifier::new(None, None);
        notifier.notify(sample()).await;
    }

    #[tokio::test]
    async fn failing_slack_does_not_propagate() {
        let notifier = SourceMapNotifier::new(
            Some(SlackConfig {
                webhook_url: "http://127.0.0.1:9/hook".into(),
                default_channel: None,
            }),
            None,
        );
        notifier.notify(sample()).await;
    }

    #[tokio::test]
    async fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(sample()).await;
        notifier
            .notify(OperationEvent::new(
                OperationKind::TemplateDeleted,
                OperationStatus::Success,
                "gone",
            ))
            .await;
        assert_eq!(
            notifier.kinds(),
            vec![OperationKind::TemplateCreated, OperationKind::TemplateDeleted]
        );
    }
}
