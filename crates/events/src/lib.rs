//! Outbound side channels for the Jobs2Go admin service.
//!
//! - [`delivery`]: Slack webhook and email (Resend with SMTP fallback)
//!   delivery channels.
//! - [`Notifier`]: best-effort broadcast of source-map operation outcomes.
//! - [`MonitoringService`]: buffered monitoring events with immediate
//!   alerting and a periodic flush loop.

pub mod delivery;
pub mod monitoring;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailMessage, EmailService};
pub use delivery::slack::{SlackConfig, SlackDelivery};
pub use monitoring::{MonitoringConfig, MonitoringService};
pub use notifier::{
    Notifier, OperationEvent, OperationKind, OperationStatus, RecordingNotifier,
    SourceMapNotifier,
};
