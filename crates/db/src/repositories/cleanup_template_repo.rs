//! Repository for the `source_map_cleanup_templates` table.
//!
//! Every write that changes template fields also appends a row to
//! `template_versions` and repoints `current_version_id`, all inside one
//! transaction. Writers to the same template are serialised by a row lock
//! taken before the next version number is computed; the
//! `uq_template_versions_template_id_version_number` constraint rejects
//! anything that slips past it.

use jobs2go_core::cleanup_template::{restored_description, INITIAL_VERSION_DESCRIPTION};
use jobs2go_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::cleanup_template::{
    CleanupTemplate, CreateTemplate, TemplateVersion, TemplateWithVersion, UpdateTemplate,
};
use crate::repositories::template_version_repo::VERSION_COLUMNS;

/// Column list for source_map_cleanup_templates queries.
const COLUMNS: &str = "\
    id, name, description, frequency, day_of_week, day_of_month, hour, minute, \
    retention_days, min_deployments_to_keep, dry_run, storage_provider, \
    notify_on_success, notify_on_failure, notification_recipients, tags, \
    is_built_in, current_version_id, created_by, created_at, updated_at";

/// Fields shared by a template and its version snapshots.
const FIELD_COLUMNS: &str = "\
    name, description, frequency, day_of_week, day_of_month, hour, minute, \
    retention_days, min_deployments_to_keep, dry_run, storage_provider, \
    notify_on_success, notify_on_failure, notification_recipients, tags";

/// Ordering used by every listing: built-ins first, then newest.
const LIST_ORDER: &str = "ORDER BY is_built_in DESC, created_at DESC, id DESC";

/// Provides CRUD and versioning operations for cleanup templates.
pub struct CleanupTemplateRepo;

impl CleanupTemplateRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// List templates, optionally excluding built-ins.
    pub async fn list(
        pool: &PgPool,
        include_built_in: bool,
    ) -> Result<Vec<CleanupTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM source_map_cleanup_templates \
             WHERE ($1 OR NOT is_built_in) \
             {LIST_ORDER}"
        );
        sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(include_built_in)
            .fetch_all(pool)
            .await
    }

    /// List templates carrying at least one of the given tags.
    pub async fn list_by_tags(
        pool: &PgPool,
        tags: &[String],
    ) -> Result<Vec<CleanupTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM source_map_cleanup_templates \
             WHERE tags && $1 \
             {LIST_ORDER}"
        );
        sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(tags)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring match on name or description, or an exact
    /// tag match.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<CleanupTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM source_map_cleanup_templates \
             WHERE name ILIKE $1 OR description ILIKE $1 OR $2 = ANY(tags) \
             {LIST_ORDER}"
        );
        sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(like_pattern(term))
            .bind(term)
            .fetch_all(pool)
            .await
    }

    /// Find a template by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CleanupTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM source_map_cleanup_templates WHERE id = $1");
        sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a template with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM source_map_cleanup_templates WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    // -----------------------------------------------------------------------
    // Versioned writes
    // -----------------------------------------------------------------------

    /// Insert a user template together with its version 1.
    ///
    /// `is_built_in` is always false for rows created here.
    pub async fn create_with_initial_version(
        pool: &PgPool,
        dto: &CreateTemplate,
    ) -> Result<TemplateWithVersion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO source_map_cleanup_templates \
                 ({FIELD_COLUMNS}, is_built_in, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, false, $16) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.frequency.as_str())
            .bind(dto.day_of_week)
            .bind(dto.day_of_month)
            .bind(dto.hour)
            .bind(dto.minute)
            .bind(dto.retention_days)
            .bind(dto.min_deployments_to_keep)
            .bind(dto.dry_run)
            .bind(&dto.storage_provider)
            .bind(dto.notify_on_success)
            .bind(dto.notify_on_failure)
            .bind(&dto.notification_recipients)
            .bind(&dto.tags)
            .bind(&dto.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let version = snapshot_version(
            &mut tx,
            template.id,
            1,
            INITIAL_VERSION_DESCRIPTION,
            dto.created_by.as_deref(),
        )
        .await?;
        let template = set_current_version(&mut tx, template.id, version.id).await?;

        tx.commit().await?;
        Ok(TemplateWithVersion {
            template,
            current_version: Some(version),
            versions: None,
        })
    }

    /// Apply a partial update and append the resulting version.
    ///
    /// Absent DTO fields keep their current value. Returns `None` if the
    /// template does not exist. Built-in checks are the caller's job.
    pub async fn update_with_new_version(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateTemplate,
        change_description: &str,
    ) -> Result<Option<TemplateWithVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_template(&mut tx, id).await? {
            return Ok(None);
        }
        let version_number = next_version_number(&mut tx, id).await?;

        let query = format!(
            "UPDATE source_map_cleanup_templates SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 frequency = COALESCE($4, frequency), \
                 day_of_week = COALESCE($5, day_of_week), \
                 day_of_month = COALESCE($6, day_of_month), \
                 hour = COALESCE($7, hour), \
                 minute = COALESCE($8, minute), \
                 retention_days = COALESCE($9, retention_days), \
                 min_deployments_to_keep = COALESCE($10, min_deployments_to_keep), \
                 dry_run = COALESCE($11, dry_run), \
                 storage_provider = COALESCE($12, storage_provider), \
                 notify_on_success = COALESCE($13, notify_on_success), \
                 notify_on_failure = COALESCE($14, notify_on_failure), \
                 notification_recipients = COALESCE($15, notification_recipients), \
                 tags = COALESCE($16, tags) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.frequency.map(|f| f.as_str()))
            .bind(dto.day_of_week)
            .bind(dto.day_of_month)
            .bind(dto.hour)
            .bind(dto.minute)
            .bind(dto.retention_days)
            .bind(dto.min_deployments_to_keep)
            .bind(dto.dry_run)
            .bind(&dto.storage_provider)
            .bind(dto.notify_on_success)
            .bind(dto.notify_on_failure)
            .bind(&dto.notification_recipients)
            .bind(&dto.tags)
            .fetch_one(&mut *tx)
            .await?;

        let version = snapshot_version(
            &mut tx,
            id,
            version_number,
            change_description,
            dto.created_by.as_deref(),
        )
        .await?;
        let template = set_current_version(&mut tx, id, version.id).await?;

        tx.commit().await?;
        Ok(Some(TemplateWithVersion {
            template,
            current_version: Some(version),
            versions: None,
        }))
    }

    /// Copy the fields of version `version_number` back onto the template and
    /// append them as a new version.
    ///
    /// Returns `None` if the template or the version does not exist.
    pub async fn restore_version(
        pool: &PgPool,
        id: DbId,
        version_number: i32,
        created_by: Option<&str>,
    ) -> Result<Option<TemplateWithVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_template(&mut tx, id).await? {
            return Ok(None);
        }
        let new_number = next_version_number(&mut tx, id).await?;

        let assignments = FIELD_COLUMNS
            .split(',')
            .map(str::trim)
            .map(|c| format!("{c} = v.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let returning = COLUMNS
            .split(',')
            .map(str::trim)
            .map(|c| format!("t.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE source_map_cleanup_templates t SET {assignments} \
             FROM template_versions v \
             WHERE t.id = $1 AND v.template_id = t.id AND v.version_number = $2 \
             RETURNING {returning}"
        );
        let restored = sqlx::query_as::<_, CleanupTemplate>(&query)
            .bind(id)
            .bind(version_number)
            .fetch_optional(&mut *tx)
            .await?;
        if restored.is_none() {
            return Ok(None);
        }

        let version = snapshot_version(
            &mut tx,
            id,
            new_number,
            &restored_description(version_number),
            created_by,
        )
        .await?;
        let template = set_current_version(&mut tx, id, version.id).await?;

        tx.commit().await?;
        Ok(Some(TemplateWithVersion {
            template,
            current_version: Some(version),
            versions: None,
        }))
    }

    /// Delete a template. Its versions cascade; schedules referencing it
    /// have `template_id` cleared. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM source_map_cleanup_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

/// Lock the template row for the rest of the transaction. Returns `false`
/// if it does not exist.
async fn lock_template(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let row: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM source_map_cleanup_templates WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

async fn next_version_number(conn: &mut PgConnection, template_id: DbId) -> Result<i32, sqlx::Error> {
    let row: (i32,) = sqlx::query_as(
        "SELECT COALESCE(MAX(version_number), 0) + 1 \
         FROM template_versions WHERE template_id = $1",
    )
    .bind(template_id)
    .fetch_one(conn)
    .await?;
    Ok(row.0)
}

/// Append a version snapshotting the template's current field values.
async fn snapshot_version(
    conn: &mut PgConnection,
    template_id: DbId,
    version_number: i32,
    change_description: &str,
    created_by: Option<&str>,
) -> Result<TemplateVersion, sqlx::Error> {
    let query = format!(
        "INSERT INTO template_versions \
             (template_id, version_number, {FIELD_COLUMNS}, change_description, created_by) \
         SELECT id, $2, {FIELD_COLUMNS}, $3, $4 \
         FROM source_map_cleanup_templates WHERE id = $1 \
         RETURNING {VERSION_COLUMNS}"
    );
    sqlx::query_as::<_, TemplateVersion>(&query)
        .bind(template_id)
        .bind(version_number)
        .bind(change_description)
        .bind(created_by)
        .fetch_one(conn)
        .await
}

async fn set_current_version(
    conn: &mut PgConnection,
    template_id: DbId,
    version_id: DbId,
) -> Result<CleanupTemplate, sqlx::Error> {
    let query = format!(
        "UPDATE source_map_cleanup_templates SET current_version_id = $2 \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, CleanupTemplate>(&query)
        .bind(template_id)
        .bind(version_id)
        .fetch_one(conn)
        .await
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("daily"), "%daily%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn field_columns_are_a_subset_of_columns() {
        for field in FIELD_COLUMNS.split(',').map(str::trim) {
            assert!(COLUMNS.contains(field), "{field} missing from COLUMNS");
            assert!(VERSION_COLUMNS.contains(field), "{field} missing from VERSION_COLUMNS");
        }
    }
}
