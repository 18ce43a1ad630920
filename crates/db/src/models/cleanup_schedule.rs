//! Cleanup schedule models.

use jobs2go_core::cleanup_schedule::ScheduleFieldCheck;
use jobs2go_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `source_map_cleanup_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSchedule {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub retention_days: i32,
    pub min_versions_to_keep: i32,
    pub cron_schedule: String,
    pub dry_run: bool,
    pub delete_from_storage: bool,
    pub delete_from_database: bool,
    pub notify_on_completion: bool,
    pub notification_channels: Vec<String>,
    pub template_id: Option<DbId>,
    pub is_active: bool,
    pub last_run: Option<Timestamp>,
    pub next_run: Option<Timestamp>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a schedule. Omitted flags take the column defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCleanupSchedule {
    pub name: String,
    pub description: Option<String>,
    pub retention_days: i32,
    pub min_versions_to_keep: i32,
    pub cron_schedule: String,
    pub dry_run: Option<bool>,
    pub delete_from_storage: Option<bool>,
    pub delete_from_database: Option<bool>,
    pub notify_on_completion: Option<bool>,
    #[serde(default)]
    pub notification_channels: Vec<String>,
    pub template_id: Option<DbId>,
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub created_by: Option<String>,
}

impl CreateCleanupSchedule {
    pub fn field_check(&self) -> ScheduleFieldCheck<'_> {
        ScheduleFieldCheck {
            name: &self.name,
            retention_days: self.retention_days,
            min_versions_to_keep: self.min_versions_to_keep,
            cron_schedule: &self.cron_schedule,
            notification_channels: &self.notification_channels,
        }
    }
}

/// DTO for partially updating a schedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCleanupSchedule {
    pub name: Option<String>,
    pub description: Option<String>,
    pub retention_days: Option<i32>,
    pub min_versions_to_keep: Option<i32>,
    pub cron_schedule: Option<String>,
    pub dry_run: Option<bool>,
    pub delete_from_storage: Option<bool>,
    pub delete_from_database: Option<bool>,
    pub notify_on_completion: Option<bool>,
    pub notification_channels: Option<Vec<String>>,
    /// `None` keeps the link, `Some(None)` (an explicit `null`) detaches it.
    #[serde(default, deserialize_with = "present")]
    pub template_id: Option<Option<DbId>>,
    pub is_active: Option<bool>,
}

/// Marks a field that was present in the body, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateCleanupSchedule {
    /// Field view of `current` with this patch applied, for validation.
    pub fn merged_check<'a>(&'a self, current: &'a CleanupSchedule) -> ScheduleFieldCheck<'a> {
        ScheduleFieldCheck {
            name: self.name.as_deref().unwrap_or(&current.name),
            retention_days: self.retention_days.unwrap_or(current.retention_days),
            min_versions_to_keep: self
                .min_versions_to_keep
                .unwrap_or(current.min_versions_to_keep),
            cron_schedule: self
                .cron_schedule
                .as_deref()
                .unwrap_or(&current.cron_schedule),
            notification_channels: self
                .notification_channels
                .as_deref()
                .unwrap_or(&current.notification_channels),
        }
    }
}
