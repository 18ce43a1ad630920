//! Handlers for template export and import.
//!
//! Export documents and import results are returned without the `data`
//! envelope so they can be saved and re-uploaded as-is.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobs2go_core::cleanup_template::TEMPLATE_NOT_FOUND;
use jobs2go_core::error::CoreError;
use jobs2go_core::types::DbId;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{RequirePermission, TemplatesRead, TemplatesWrite};
use crate::query::ExportParams;
use crate::services::template_sharing::ExportOrigin;
use crate::state::AppState;

/// Request body for `POST /templates/export`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub template_ids: Vec<DbId>,
}

fn origin(state: &AppState) -> ExportOrigin<'_> {
    ExportOrigin {
        source: &state.config.app_url,
        environment: state.config.stage.as_str(),
    }
}

/// GET /api/admin/source-maps/templates/export?id=
pub async fn export_template(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let id = params
        .id
        .ok_or_else(|| AppError::BadRequest("Template ID is required".into()))?;

    let document = state
        .templates()
        .export_template(id, origin(&state))
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage(TEMPLATE_NOT_FOUND.into())))?;

    Ok(Json(document))
}

/// POST /api/admin/source-maps/templates/export
///
/// Export several templates; ids that do not exist are skipped.
pub async fn export_templates(
    _perm: RequirePermission<TemplatesRead>,
    State(state): State<AppState>,
    Json(input): Json<ExportRequest>,
) -> AppResult<impl IntoResponse> {
    if input.template_ids.is_empty() {
        return Err(AppError::BadRequest("Template IDs are required".into()));
    }

    let document = state
        .templates()
        .export_templates(&input.template_ids, origin(&state))
        .await?;

    Ok(Json(document))
}

/// POST /api/admin/source-maps/templates/import
///
/// 200 with the result when at least one template was imported, 400 with
/// the result under `details` otherwise.
pub async fn import_templates(
    RequirePermission { user, .. }: RequirePermission<TemplatesWrite>,
    State(state): State<AppState>,
    Json(document): Json<serde_json::Value>,
) -> AppResult<Response> {
    let result = state
        .templates()
        .import_templates(document, user.email)
        .await;

    let mut details = serde_json::Map::new();
    details.insert("userId".into(), user.user_id.into());
    details.insert("imported".into(), result.imported.into());
    details.insert("failed".into(), result.failed.into());
    state
        .monitoring
        .track_business_event("templates_imported", details)
        .await;

    if !result.success {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Import partially failed",
                "details": result,
            })),
        )
            .into_response());
    }

    Ok(Json(result).into_response())
}
