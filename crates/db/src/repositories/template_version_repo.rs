//! Repository for the `template_versions` table.
//!
//! Versions are immutable snapshots written by [`CleanupTemplateRepo`]
//! inside its transactions; this repository only reads them.
//!
//! [`CleanupTemplateRepo`]: super::CleanupTemplateRepo

use jobs2go_core::types::DbId;
use sqlx::PgPool;

use crate::models::cleanup_template::TemplateVersion;

/// Column list for template_versions queries.
pub(crate) const VERSION_COLUMNS: &str = "\
    id, template_id, version_number, name, description, frequency, \
    day_of_week, day_of_month, hour, minute, retention_days, \
    min_deployments_to_keep, dry_run, storage_provider, notify_on_success, \
    notify_on_failure, notification_recipients, tags, change_description, \
    created_by, created_at";

/// Provides read operations for template versions.
pub struct TemplateVersionRepo;

impl TemplateVersionRepo {
    /// List all versions for a template, newest first.
    pub async fn list_by_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Find a specific version of a template.
    pub async fn find_by_number(
        pool: &PgPool,
        template_id: DbId,
        version_number: i32,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// Find versions by primary key. Used to attach current versions to a
    /// template listing.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {VERSION_COLUMNS} FROM template_versions WHERE id = ANY($1)");
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Get the latest version number for a template (0 if none exist).
    pub async fn latest_version_number(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) FROM template_versions WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
