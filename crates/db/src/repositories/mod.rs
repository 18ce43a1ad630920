//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod cleanup_schedule_repo;
pub mod cleanup_template_repo;
pub mod monitoring_event_repo;
pub mod permission_repo;
pub mod template_version_repo;

pub use cleanup_schedule_repo::CleanupScheduleRepo;
pub use cleanup_template_repo::CleanupTemplateRepo;
pub use monitoring_event_repo::MonitoringEventRepo;
pub use permission_repo::PermissionRepo;
pub use template_version_repo::TemplateVersionRepo;
