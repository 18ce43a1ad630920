//! Email delivery: Resend HTTP API first, SMTP (`lettre`) as fallback.
//!
//! [`EmailService::send_email`] tries Resend when it is the selected provider
//! and an API key is configured; if that fails (or Resend is not in use) the
//! message goes out over SMTP. Incomplete SMTP settings make the send return
//! `false` with a warning instead of an error.

use std::time::Duration;

use jobs2go_core::monitoring::Severity;
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

/// HTTP request timeout for a Resend API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PROVIDER: &str = "resend";
const DEFAULT_FROM_ADDRESS: &str = "onboarding@resend.dev";
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The Resend API request failed.
    #[error("Resend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Resend API answered with a non-2xx status code.
    #[error("Resend returned HTTP {0}")]
    HttpStatus(u16),

    /// A required setting for the chosen transport is missing.
    #[error("Email transport not configured: {0}")]
    NotConfigured(&'static str),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// SMTP settings. Host, user and password are all required to send.
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS when true, STARTTLS otherwise.
    pub secure: bool,
}

/// Configuration for the email service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: String,
    pub from_address: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub smtp: SmtpConfig,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                                   | Default                 |
    /// |--------------------------------------------|-------------------------|
    /// | `EMAIL_PROVIDER`                           | `resend`                |
    /// | `EMAIL_FROM`                               | `onboarding@resend.dev` |
    /// | `EMAIL_FROM_NAME`                          | -                       |
    /// | `EMAIL_REPLY_TO`                           | -                       |
    /// | `RESEND_API_KEY`                           | -                       |
    /// | `EMAIL_SERVER_HOST` / `EMAIL_HOST`         | -                       |
    /// | `EMAIL_SERVER_PORT` / `EMAIL_PORT`         | `587`                   |
    /// | `EMAIL_SERVER_USER` / `EMAIL_USER`         | -                       |
    /// | `EMAIL_SERVER_PASSWORD` / `EMAIL_PASSWORD` | -                       |
    /// | `EMAIL_SECURE`                             | `false`                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let either = |a: &str, b: &str| get(a).or_else(|| get(b));

        Self {
            provider: get("EMAIL_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            from_address: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: get("EMAIL_FROM_NAME"),
            reply_to: get("EMAIL_REPLY_TO"),
            resend_api_key: get("RESEND_API_KEY"),
            resend_api_url: DEFAULT_RESEND_API_URL.to_string(),
            smtp: SmtpConfig {
                host: either("EMAIL_SERVER_HOST", "EMAIL_HOST"),
                port: either("EMAIL_SERVER_PORT", "EMAIL_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_SMTP_PORT),
                user: either("EMAIL_SERVER_USER", "EMAIL_USER"),
                password: either("EMAIL_SERVER_PASSWORD", "EMAIL_PASSWORD"),
                secure: get("EMAIL_SECURE").as_deref() == Some("true"),
            },
        }
    }

    /// `Name <address>` when a display name is configured.
    fn sender(&self, override_from: Option<&str>) -> String {
        let address = override_from.unwrap_or(&self.from_address);
        match &self.from_name {
            Some(name) if !address.contains('<') => format!("{name} <{address}>"),
            _ => address.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// An outbound email. At least one of `text` / `html` should be set.
#[derive(Debug, Clone, Default)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    /// Overrides the configured sender address.
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: String,
    to: &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// EmailService
// ---------------------------------------------------------------------------

/// Sends email through Resend with SMTP fallback.
pub struct EmailService {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    pub fn resend_configured(&self) -> bool {
        self.config.resend_api_key.is_some()
    }

    pub fn smtp_configured(&self) -> bool {
        let smtp = &self.config.smtp;
        smtp.host.is_some() && smtp.user.is_some() && smtp.password.is_some()
    }

    /// Send a message. Returns whether any transport accepted it.
    pub async fn send_email(&self, message: &EmailMessage) -> bool {
        if self.config.provider == DEFAULT_PROVIDER && self.resend_configured() {
            match self.send_via_resend(message).await {
                Ok(()) => {
                    tracing::info!(to = ?message.to, subject = %message.subject, "Email sent via Resend");
                    return true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Resend failed, falling back to SMTP");
                }
            }
        }

        match self.send_via_smtp(message).await {
            Ok(()) => {
                tracing::info!(to = ?message.to, subject = %message.subject, "Email sent via SMTP");
                true
            }
            Err(EmailError::NotConfigured(what)) => {
                tracing::warn!(missing = what, "SMTP not configured, email not sent");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send email via SMTP");
                false
            }
        }
    }

    /// Send a severity-tagged alert.
    pub async fn send_alert(
        &self,
        to: &[String],
        title: &str,
        message: &str,
        severity: Severity,
    ) -> bool {
        let label = severity.as_str().to_uppercase();
        let timestamp = chrono::Utc::now().to_rfc3339();
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>{icon} {title}</h2>\
             <p style=\"color: #666; line-height: 1.5;\">{message}</p>\
             <p style=\"font-size: 12px; color: #999;\">Timestamp: {timestamp}<br>Severity: {label}</p>\
             </div>",
            icon = severity_icon(severity),
            title = escape_html(title),
            message = escape_html(message),
        );

        self.send_email(&EmailMessage {
            to: to.to_vec(),
            subject: format!("[{label}] {title}"),
            text: Some(format!("{title}\n\n{message}")),
            html: Some(html),
            from: None,
        })
        .await
    }

    async fn send_via_resend(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let api_key = self
            .config
            .resend_api_key
            .as_deref()
            .ok_or(EmailError::NotConfigured("RESEND_API_KEY"))?;

        let payload = ResendPayload {
            from: self.config.sender(message.from.as_deref()),
            to: &message.to,
            subject: &message.subject,
            text: message.text.as_deref(),
            html: message.html.as_deref(),
            reply_to: self.config.reply_to.as_deref(),
        };
        let response = self
            .client
            .post(&self.config.resend_api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(EmailError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    async fn send_via_smtp(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let smtp = &self.config.smtp;
        let (Some(host), Some(user), Some(password)) = (&smtp.host, &smtp.user, &smtp.password)
        else {
            return Err(EmailError::NotConfigured("EMAIL_SERVER_HOST/USER/PASSWORD"));
        };

        let email = build_message(&self.config, message)?;

        let builder = if smtp.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };
        let mailer = builder
            .port(smtp.port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();
        mailer.send(email).await?;
        Ok(())
    }
}

/// Assemble the MIME message for SMTP delivery.
fn build_message(config: &EmailConfig, message: &EmailMessage) -> Result<Message, EmailError> {
    if message.to.is_empty() {
        return Err(EmailError::Build("no recipients".to_string()));
    }

    let from: Mailbox = config.sender(message.from.as_deref()).parse()?;
    let mut builder = Message::builder().from(from).subject(&message.subject);
    for to in &message.to {
        builder = builder.to(to.parse()?);
    }
    if let Some(reply_to) = &config.reply_to {
        builder = builder.reply_to(reply_to.parse()?);
    }

    let built = match (&message.text, &message.html) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (text, None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone().unwrap_or_default()),
    };
    built.map_err(|e| EmailError::Build(e.to_string()))
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "ℹ️",
        Severity::Warning => "⚠️",
        Severity::Error | Severity::Critical => "🚨",
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
