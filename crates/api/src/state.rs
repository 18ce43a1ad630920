use std::sync::Arc;
use std::time::Instant;

use jobs2go_events::{EmailService, MonitoringService, Notifier};

use crate::config::ServerConfig;
use crate::permissions::PermissionChecker;
use crate::services::template_service::TemplateService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: jobs2go_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Cached role/permission lookups.
    pub permissions: Arc<PermissionChecker>,
    /// Best-effort Slack/email broadcast of operation outcomes.
    pub notifier: Arc<dyn Notifier>,
    /// Outbound email, used directly by the test-email endpoints.
    pub email: Arc<EmailService>,
    /// Monitoring context (event buffer and flush loop).
    pub monitoring: Arc<MonitoringService>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Template service bound to this state's pool and notifier.
    pub fn templates(&self) -> TemplateService {
        TemplateService::new(self.pool.clone(), Arc::clone(&self.notifier))
    }
}
