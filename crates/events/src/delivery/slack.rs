//! Slack incoming-webhook delivery.

use std::time::Duration;

use serde::Serialize;

/// HTTP request timeout for a single webhook call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Username shown on every message.
pub const BOT_USERNAME: &str = "Jobs2Go Bot";

const BOT_ICON: &str = ":robot_face:";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Slack delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Slack answered with a non-2xx status code.
    #[error("Slack webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the Slack webhook channel.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub default_channel: Option<String>,
}

impl SlackConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SLACK_WEBHOOK_URL` is unset or empty, which
    /// disables the channel.
    ///
    /// | Variable                | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `SLACK_WEBHOOK_URL`     | yes      | -       |
    /// | `SLACK_DEFAULT_CHANNEL` | no       | -       |
    pub fn from_env() -> Option<Self> {
        let webhook_url = std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            webhook_url,
            default_channel: std::env::var("SLACK_DEFAULT_CHANNEL").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Payload accepted by a Slack incoming webhook.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub username: String,
    pub icon_emoji: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlackAttachment {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl SlackMessage {
    /// A message with a single coloured attachment.
    pub fn with_attachment(text: impl Into<String>, attachment: SlackAttachment) -> Self {
        Self {
            text: text.into(),
            channel: None,
            username: BOT_USERNAME.to_string(),
            icon_emoji: BOT_ICON.to_string(),
            attachments: vec![attachment],
        }
    }
}

// ---------------------------------------------------------------------------
// SlackDelivery
// ---------------------------------------------------------------------------

/// Posts messages to a Slack incoming webhook.
pub struct SlackDelivery {
    client: reqwest::Client,
    config: SlackConfig,
}

impl SlackDelivery {
    pub fn new(config: SlackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Send one message. No retries.
    pub async fn send(&self, message: &SlackMessage) -> Result<(), SlackError> {
        let mut message = message.clone();
        if message.channel.is_none() {
            message.channel = self.config.default_channel.clone();
        }

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SlackError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
