//! Cleanup template and template version models.

use jobs2go_core::cleanup_template::{Frequency, TemplateFieldCheck};
use jobs2go_core::template_sharing::ExportedTemplate;
use jobs2go_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `source_map_cleanup_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupTemplate {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub hour: i16,
    pub minute: i16,
    pub retention_days: i32,
    pub min_deployments_to_keep: i32,
    pub dry_run: bool,
    pub storage_provider: String,
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
    pub notification_recipients: Vec<String>,
    pub tags: Vec<String>,
    pub is_built_in: bool,
    pub current_version_id: Option<DbId>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `template_versions` table. Never updated after insert.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    pub id: DbId,
    pub template_id: DbId,
    pub version_number: i32,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub hour: i16,
    pub minute: i16,
    pub retention_days: i32,
    pub min_deployments_to_keep: i32,
    pub dry_run: bool,
    pub storage_provider: String,
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
    pub notification_recipients: Vec<String>,
    pub tags: Vec<String>,
    pub change_description: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
}

/// A template joined with its current version and, optionally, its history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateWithVersion {
    #[serde(flatten)]
    pub template: CleanupTemplate,
    pub current_version: Option<TemplateVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<TemplateVersion>>,
}

impl CleanupTemplate {
    /// Portable copy of this template, without identity or provenance.
    ///
    /// A frequency value the enum does not know falls back to `DAILY`; the
    /// column's CHECK constraint makes that unreachable in practice.
    pub fn to_export(&self) -> ExportedTemplate {
        ExportedTemplate {
            name: self.name.clone(),
            description: self.description.clone(),
            frequency: self.frequency.parse().unwrap_or(Frequency::Daily),
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            hour: self.hour,
            minute: self.minute,
            retention_days: self.retention_days,
            min_deployments_to_keep: self.min_deployments_to_keep,
            dry_run: self.dry_run,
            storage_provider: self.storage_provider.clone(),
            notify_on_success: self.notify_on_success,
            notify_on_failure: self.notify_on_failure,
            notification_recipients: self.notification_recipients.clone(),
            tags: self.tags.clone(),
            metadata: None,
        }
    }

    /// Create payload copying every field of this template.
    pub fn to_create(&self, name: String, created_by: Option<String>) -> CreateTemplate {
        CreateTemplate {
            name,
            description: self.description.clone(),
            frequency: self.frequency.parse().unwrap_or(Frequency::Daily),
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            hour: self.hour,
            minute: self.minute,
            retention_days: self.retention_days,
            min_deployments_to_keep: self.min_deployments_to_keep,
            dry_run: self.dry_run,
            storage_provider: self.storage_provider.clone(),
            notify_on_success: self.notify_on_success,
            notify_on_failure: self.notify_on_failure,
            notification_recipients: self.notification_recipients.clone(),
            tags: self.tags.clone(),
            created_by,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

fn default_storage_provider() -> String {
    "s3".to_string()
}

fn default_true() -> bool {
    true
}

/// DTO for creating a template. `created_by` is stamped by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub day_of_week: Option<i16>,
    #[serde(default)]
    pub day_of_month: Option<i16>,
    pub hour: i16,
    pub minute: i16,
    pub retention_days: i32,
    pub min_deployments_to_keep: i32,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_storage_provider")]
    pub storage_provider: String,
    #[serde(default)]
    pub notify_on_success: bool,
    #[serde(default = "default_true")]
    pub notify_on_failure: bool,
    #[serde(default)]
    pub notification_recipients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub created_by: Option<String>,
}

impl CreateTemplate {
    pub fn field_check(&self) -> TemplateFieldCheck<'_> {
        TemplateFieldCheck {
            name: &self.name,
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            hour: self.hour,
            minute: self.minute,
            retention_days: self.retention_days,
            min_deployments_to_keep: self.min_deployments_to_keep,
            storage_provider: &self.storage_provider,
        }
    }
}

impl From<ExportedTemplate> for CreateTemplate {
    fn from(t: ExportedTemplate) -> Self {
        Self {
            name: t.name,
            description: t.description,
            frequency: t.frequency,
            day_of_week: t.day_of_week,
            day_of_month: t.day_of_month,
            hour: t.hour,
            minute: t.minute,
            retention_days: t.retention_days,
            min_deployments_to_keep: t.min_deployments_to_keep,
            dry_run: t.dry_run,
            storage_provider: t.storage_provider,
            notify_on_success: t.notify_on_success,
            notify_on_failure: t.notify_on_failure,
            notification_recipients: t.notification_recipients,
            tags: t.tags,
            created_by: None,
        }
    }
}

/// DTO for updating a template. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub hour: Option<i16>,
    pub minute: Option<i16>,
    pub retention_days: Option<i32>,
    pub min_deployments_to_keep: Option<i32>,
    pub dry_run: Option<bool>,
    pub storage_provider: Option<String>,
    pub notify_on_success: Option<bool>,
    pub notify_on_failure: Option<bool>,
    pub notification_recipients: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub change_description: Option<String>,
    #[serde(skip)]
    pub created_by: Option<String>,
}

impl UpdateTemplate {
    /// Field view of `current` with this patch applied, for validation.
    pub fn merged_check<'a>(&'a self, current: &'a CleanupTemplate) -> TemplateFieldCheck<'a> {
        TemplateFieldCheck {
            name: self.name.as_deref().unwrap_or(&current.name),
            day_of_week: self.day_of_week.or(current.day_of_week),
            day_of_month: self.day_of_month.or(current.day_of_month),
            hour: self.hour.unwrap_or(current.hour),
            minute: self.minute.unwrap_or(current.minute),
            retention_days: self.retention_days.unwrap_or(current.retention_days),
            min_deployments_to_keep: self
                .min_deployments_to_keep
                .unwrap_or(current.min_deployments_to_keep),
            storage_provider: self
                .storage_provider
                .as_deref()
                .unwrap_or(&current.storage_provider),
        }
    }
}
