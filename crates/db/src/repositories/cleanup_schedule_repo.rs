//! Repository for the `source_map_cleanup_schedules` table.

use jobs2go_core::types::DbId;
use sqlx::PgPool;

use crate::models::cleanup_schedule::{
    CleanupSchedule, CreateCleanupSchedule, UpdateCleanupSchedule,
};

/// Column list for source_map_cleanup_schedules queries.
const COLUMNS: &str = "\
    id, name, description, retention_days, min_versions_to_keep, cron_schedule, \
    dry_run, delete_from_storage, delete_from_database, notify_on_completion, \
    notification_channels, template_id, is_active, last_run, next_run, \
    created_by, created_at, updated_at";

/// Provides CRUD operations for cleanup schedules.
pub struct CleanupScheduleRepo;

impl CleanupScheduleRepo {
    /// List all schedules, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<CleanupSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM source_map_cleanup_schedules \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CleanupSchedule>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a schedule by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CleanupSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM source_map_cleanup_schedules WHERE id = $1");
        sqlx::query_as::<_, CleanupSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new schedule. Omitted flags fall back to the column defaults.
    pub async fn create(
        pool: &PgPool,
        dto: &CreateCleanupSchedule,
    ) -> Result<CleanupSchedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO source_map_cleanup_schedules \
                 (name, description, retention_days, min_versions_to_keep, cron_schedule, \
                  dry_run, delete_from_storage, delete_from_database, notify_on_completion, \
                  notification_channels, template_id, is_active, created_by) \
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, \
                     COALESCE($6, false), COALESCE($7, true), COALESCE($8, true), \
                     COALESCE($9, true), $10, $11, COALESCE($12, true), $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CleanupSchedule>(&query)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.retention_days)
            .bind(dto.min_versions_to_keep)
            .bind(&dto.cron_schedule)
            .bind(dto.dry_run)
            .bind(dto.delete_from_storage)
            .bind(dto.delete_from_database)
            .bind(dto.notify_on_completion)
            .bind(&dto.notification_channels)
            .bind(dto.template_id.is_some())
            .bind(dto.template_id)
            .bind(dto.is_active)
            .bind(&dto.created_by)
            .fetch_one(pool)
            .await
    }

    /// Partially update a schedule.
    ///
    /// Uses `COALESCE` so only provided fields are changed.
    /// `template_id` uses `Option<Option<DbId>>` to allow detaching the template.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        dto: &UpdateCleanupSchedule,
    ) -> Result<Option<CleanupSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE source_map_cleanup_schedules SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 retention_days = COALESCE($4, retention_days), \
                 min_versions_to_keep = COALESCE($5, min_versions_to_keep), \
                 cron_schedule = COALESCE($6, cron_schedule), \
                 dry_run = COALESCE($7, dry_run), \
                 delete_from_storage = COALESCE($8, delete_from_storage), \
                 delete_from_database = COALESCE($9, delete_from_database), \
                 notify_on_completion = COALESCE($10, notify_on_completion), \
                 notification_channels = COALESCE($11, notification_channels), \
                 template_id = CASE WHEN $12 THEN $13 ELSE template_id END, \
                 is_active = COALESCE($14, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CleanupSchedule>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.retention_days)
            .bind(dto.min_versions_to_keep)
            .bind(&dto.cron_schedule)
            .bind(dto.dry_run)
            .bind(dto.delete_from_storage)
            .bind(dto.delete_from_database)
            .bind(dto.notify_on_completion)
            .bind(&dto.notification_channels)
            .bind(dto.template_id.is_some())
            .bind(dto.template_id.flatten())
            .bind(dto.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a schedule by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM source_map_cleanup_schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
