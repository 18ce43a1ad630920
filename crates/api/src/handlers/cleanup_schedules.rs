//! Handlers for source-map cleanup schedules.
//!
//! Schedules are configuration records only; nothing here runs them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobs2go_core::cleanup_schedule::{validate_schedule_fields, SYSTEM_CREATOR};
use jobs2go_core::error::CoreError;
use jobs2go_core::types::DbId;
use jobs2go_db::models::cleanup_schedule::{CreateCleanupSchedule, UpdateCleanupSchedule};
use jobs2go_db::repositories::{CleanupScheduleRepo, CleanupTemplateRepo};
use jobs2go_events::{OperationEvent, OperationKind, OperationStatus};

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{
    RequirePermission, SourceMapsDelete, SourceMapsRead, SourceMapsWrite,
};
use crate::response::DataResponse;
use crate::state::AppState;

fn schedule_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CleanupSchedule",
        id,
    })
}

fn check_fields(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::ValidationList(errors)))
    }
}

/// A referenced template must exist when the schedule is written.
async fn check_template_ref(state: &AppState, template_id: Option<DbId>) -> AppResult<()> {
    match template_id {
        Some(id) if !CleanupTemplateRepo::exists(&state.pool, id).await? => Err(AppError::Core(
            CoreError::ValidationList(vec![format!("templateId: template {id} does not exist")]),
        )),
        _ => Ok(()),
    }
}

/// GET /api/admin/source-maps/cleanup-schedules
///
/// List all schedules, newest first.
pub async fn list_schedules(
    _perm: RequirePermission<SourceMapsRead>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let schedules = CleanupScheduleRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: schedules }))
}

/// POST /api/admin/source-maps/cleanup-schedules
pub async fn create_schedule(
    RequirePermission { user, .. }: RequirePermission<SourceMapsWrite>,
    State(state): State<AppState>,
    Json(mut input): Json<CreateCleanupSchedule>,
) -> AppResult<impl IntoResponse> {
    check_fields(validate_schedule_fields(&input.field_check()))?;
    check_template_ref(&state, input.template_id).await?;
    input.created_by = Some(user.email.unwrap_or_else(|| SYSTEM_CREATOR.to_string()));

    let schedule = CleanupScheduleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        schedule_id = schedule.id,
        name = %schedule.name,
        user_id = user.user_id,
        "Cleanup schedule created",
    );

    state
        .notifier
        .notify(
            OperationEvent::new(
                OperationKind::ScheduleCreated,
                OperationStatus::Success,
                format!("Cleanup schedule \"{}\" created", schedule.name),
            )
            .with_detail("scheduleId", schedule.id)
            .with_detail("cronSchedule", schedule.cron_schedule.as_str()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: schedule })))
}

/// GET /api/admin/source-maps/cleanup-schedules/{id}
pub async fn get_schedule(
    _perm: RequirePermission<SourceMapsRead>,
    State(state): State<AppState>,
    Path(schedule_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = CleanupScheduleRepo::find_by_id(&state.pool, schedule_id)
        .await?
        .ok_or_else(|| schedule_not_found(schedule_id))?;

    Ok(Json(DataResponse { data: schedule }))
}

/// PUT /api/admin/source-maps/cleanup-schedules/{id}
///
/// Partially update a schedule.
pub async fn update_schedule(
    RequirePermission { user, .. }: RequirePermission<SourceMapsWrite>,
    State(state): State<AppState>,
    Path(schedule_id): Path<DbId>,
    Json(input): Json<UpdateCleanupSchedule>,
) -> AppResult<impl IntoResponse> {
    let current = CleanupScheduleRepo::find_by_id(&state.pool, schedule_id)
        .await?
        .ok_or_else(|| schedule_not_found(schedule_id))?;
    check_fields(validate_schedule_fields(&input.merged_check(&current)))?;
    check_template_ref(&state, input.template_id.flatten()).await?;

    let schedule = CleanupScheduleRepo::update(&state.pool, schedule_id, &input)
        .await?
        .ok_or_else(|| schedule_not_found(schedule_id))?;

    tracing::info!(schedule_id, user_id = user.user_id, "Cleanup schedule updated");

    state
        .notifier
        .notify(
            OperationEvent::new(
                OperationKind::ScheduleUpdated,
                OperationStatus::Success,
                format!("Cleanup schedule \"{}\" updated", schedule.name),
            )
            .with_detail("scheduleId", schedule.id),
        )
        .await;

    Ok(Json(DataResponse { data: schedule }))
}

/// DELETE /api/admin/source-maps/cleanup-schedules/{id}
pub async fn delete_schedule(
    RequirePermission { user, .. }: RequirePermission<SourceMapsDelete>,
    State(state): State<AppState>,
    Path(schedule_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CleanupScheduleRepo::delete(&state.pool, schedule_id).await? {
        return Err(schedule_not_found(schedule_id));
    }

    tracing::info!(schedule_id, user_id = user.user_id, "Cleanup schedule deleted");

    state
        .notifier
        .notify(
            OperationEvent::new(
                OperationKind::ScheduleDeleted,
                OperationStatus::Success,
                format!("Cleanup schedule {schedule_id} deleted"),
            )
            .with_detail("scheduleId", schedule_id),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
