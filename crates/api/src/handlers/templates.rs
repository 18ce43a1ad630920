//! Handlers for cleanup templates and their version history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobs2go_core::cleanup_template::{with_custom_tag, TEMPLATE_NOT_FOUND, VERSION_NOT_FOUND};
use jobs2go_core::error::CoreError;
use jobs2go_core::types::DbId;
use jobs2go_db::models::cleanup_template::{CreateTemplate, UpdateTemplate};
use jobs2go_db::repositories::CleanupTemplateRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{
    RequirePermission, TemplatesDelete, TemplatesRead, TemplatesWrite,
};
use crate::query::{TemplateDetailParams, TemplateListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Creator recorded when the session carries no email.
const UNKNOWN_CREATOR: &str = "unknown";

fn template_not_found() -> AppError {
    AppError::Core(CoreError::NotFoundMessage(TEMPLATE_NOT_FOUND.into()))
}

/// GET /api/admin/source-maps/templates
///
/// List templates. `?q=` searches, `?tags=a,b` filters by any tag, and
/// `?includeBuiltIn=false` hides built-ins from the plain listing.
pub async fn list_templates(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> AppResult<impl IntoResponse> {
    let service = state.templates();
    let tags = params.tag_list();

    let templates = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => service.search_templates(q).await?,
        _ if !tags.is_empty() => service.get_templates_by_tags(&tags).await?,
        _ => service.get_templates(params.include_built_in).await?,
    };

    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/admin/source-maps/templates
///
/// Create a user template. The session email becomes `createdBy` and the
/// `custom` tag is always present.
pub async fn create_template(
    RequirePermission { user, .. }: RequirePermission<TemplatesWrite>,
    State(state): State<AppState>,
    Json(mut input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    input.created_by = Some(user.email.unwrap_or_else(|| UNKNOWN_CREATOR.to_string()));
    input.tags = with_custom_tag(input.tags);

    let template = state.templates().create_template(input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/admin/source-maps/templates/{id}
///
/// `?includeVersions=true` adds the full history, newest first.
pub async fn get_template(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Query(params): Query<TemplateDetailParams>,
) -> AppResult<impl IntoResponse> {
    let template = state
        .templates()
        .get_template_by_id(template_id, params.include_versions)
        .await?
        .ok_or_else(template_not_found)?;

    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/admin/source-maps/templates/{id}
///
/// Partially update a template, appending a new version.
pub async fn update_template(
    RequirePermission { user, .. }: RequirePermission<TemplatesWrite>,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Json(mut input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    input.created_by = user.email;

    let template = state
        .templates()
        .update_template(template_id, input)
        .await?;

    tracing::info!(template_id, user_id = user.user_id, "Template update requested");

    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/admin/source-maps/templates/{id}
pub async fn delete_template(
    RequirePermission { user, .. }: RequirePermission<TemplatesDelete>,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.templates().delete_template(template_id).await?;

    tracing::info!(template_id, user_id = user.user_id, "Template delete requested");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/source-maps/templates/{id}/duplicate
pub async fn duplicate_template(
    RequirePermission { user, .. }: RequirePermission<TemplatesWrite>,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let copy = state
        .templates()
        .duplicate_template(template_id, user.email)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}

/// GET /api/admin/source-maps/templates/{id}/versions
///
/// Version history, newest first.
pub async fn list_versions(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CleanupTemplateRepo::exists(&state.pool, template_id).await? {
        return Err(template_not_found());
    }
    let versions = state.templates().get_template_versions(template_id).await?;

    Ok(Json(DataResponse { data: versions }))
}

/// GET /api/admin/source-maps/templates/{id}/versions/{version_number}
pub async fn get_version(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Path((template_id, version_number)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let version = state
        .templates()
        .get_template_version(template_id, version_number)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage(VERSION_NOT_FOUND.into())))?;

    Ok(Json(DataResponse { data: version }))
}

/// POST /api/admin/source-maps/templates/{id}/versions/{version_number}/restore
///
/// Append a new version copying the fields of `version_number`.
pub async fn restore_version(
    RequirePermission { user, .. }: RequirePermission<TemplatesWrite>,
    State(state): State<AppState>,
    Path((template_id, version_number)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let template = state
        .templates()
        .restore_template_version(template_id, version_number, user.email)
        .await?;

    Ok(Json(DataResponse { data: template }))
}
