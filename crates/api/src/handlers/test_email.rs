//! Handlers for verifying outbound email after a deployment.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use jobs2go_core::monitoring::Severity;
use jobs2go_events::delivery::email::escape_html;
use jobs2go_events::EmailMessage;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::config::parse_list;
use crate::error::{AppError, AppResult};
use crate::middleware::permission::{AdminAccess, RequirePermission};
use crate::query::TestEmailParams;
use crate::state::AppState;

/// Recipient used when neither `?email=` nor `ALERT_RECIPIENTS` is set.
const FALLBACK_RECIPIENT: &str = "test@example.com";

const TEST_SUBJECT: &str = "Jobs2Go Email Test - Deployment Verification";

/// Outcome of `GET /api/test/email`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTestResults {
    pub email_sent: bool,
    pub alert_sent: bool,
    pub provider: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EmailTestResponse {
    pub success: bool,
    pub message: &'static str,
    pub results: EmailTestResults,
}

/// Kind of message sent by `POST /api/test/email`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestEmailKind {
    #[default]
    Email,
    Alert,
}

/// Request body for `POST /api/test/email`.
#[derive(Debug, Deserialize)]
pub struct SendTestEmail {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: TestEmailKind,
}

#[derive(Debug, Serialize)]
pub struct SendTestEmailResponse {
    pub success: bool,
    pub message: &'static str,
    pub provider: String,
    pub timestamp: String,
}

/// Resolve and check the recipients for a test send.
fn test_recipients(requested: Option<&str>, defaults: &[String]) -> AppResult<Vec<String>> {
    let recipients = match requested.map(str::trim).filter(|e| !e.is_empty()) {
        Some(raw) => parse_list(raw),
        None if !defaults.is_empty() => defaults.to_vec(),
        None => vec![FALLBACK_RECIPIENT.to_string()],
    };

    if let Some(bad) = recipients.iter().find(|r| !r.validate_email()) {
        return Err(AppError::BadRequest(format!("Invalid email address: {bad}")));
    }
    Ok(recipients)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// GET /api/test/email?email=
///
/// Send a plain test email and an info alert to `email`, falling back to
/// `ALERT_RECIPIENTS`.
pub async fn run_email_test(
    RequirePermission { user, .. }: RequirePermission<AdminAccess>,
    State(state): State<AppState>,
    Query(params): Query<TestEmailParams>,
) -> AppResult<impl IntoResponse> {
    let to = test_recipients(params.email.as_deref(), &state.config.alert_recipients)?;
    let provider = state.email.config().provider.clone();
    let timestamp = now_rfc3339();

    tracing::info!(user_id = user.user_id, to = ?to, "Running email test");

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">Email Configuration Test</h2>\
         <p>This email confirms that your Jobs2Go platform email configuration is working correctly.</p>\
         <ul>\
         <li><strong>Timestamp:</strong> {timestamp}</li>\
         <li><strong>Provider:</strong> {provider}</li>\
         <li><strong>Environment:</strong> {environment}</li>\
         </ul>\
         </div>",
        provider = escape_html(&provider),
        environment = state.config.stage.as_str(),
    );

    let email_sent = state
        .email
        .send_email(&EmailMessage {
            to: to.clone(),
            subject: TEST_SUBJECT.to_string(),
            text: Some(
                "This is a test email to verify the email configuration is working correctly \
                 after deployment."
                    .to_string(),
            ),
            html: Some(html),
            from: None,
        })
        .await;

    let alert_sent = state
        .email
        .send_alert(
            &to,
            "Email Configuration Test",
            "This is a test alert to verify alert email functionality is working correctly.",
            Severity::Info,
        )
        .await;

    Ok(Json(EmailTestResponse {
        success: true,
        message: "Email test completed",
        results: EmailTestResults {
            email_sent,
            alert_sent,
            provider,
            timestamp,
        },
    }))
}

/// POST /api/test/email
///
/// Send a caller-composed email or info alert.
pub async fn send_test_email(
    RequirePermission { user, .. }: RequirePermission<AdminAccess>,
    State(state): State<AppState>,
    Json(input): Json<SendTestEmail>,
) -> AppResult<impl IntoResponse> {
    let (Some(to), Some(subject), Some(message)) = (
        input.to.filter(|v| !v.trim().is_empty()),
        input.subject.filter(|v| !v.trim().is_empty()),
        input.message.filter(|v| !v.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields: to, subject, message".into(),
        ));
    };
    let to = test_recipients(Some(to.as_str()), &[])?;

    let success = match input.kind {
        TestEmailKind::Alert => {
            state
                .email
                .send_alert(&to, &subject, &message, Severity::Info)
                .await
        }
        TestEmailKind::Email => {
            let html = format!(
                "<div style=\"font-family: Arial, sans-serif;\"><p>{}</p></div>",
                escape_html(&message)
            );
            state
                .email
                .send_email(&EmailMessage {
                    to,
                    subject,
                    text: Some(message),
                    html: Some(html),
                    from: None,
                })
                .await
        }
    };

    tracing::info!(user_id = user.user_id, kind = ?input.kind, success, "Test email sent");

    Ok(Json(SendTestEmailResponse {
        success,
        message: if success {
            "Email sent successfully"
        } else {
            "Email sending failed"
        },
        provider: state.email.config().provider.clone(),
        timestamp: now_rfc3339(),
    }))
}
