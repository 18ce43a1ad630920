//! Handlers for reading and invalidating cached permissions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobs2go_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::permission::{RequirePermission, RolesWrite};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/auth/permissions
///
/// The caller's effective permissions, sorted.
pub async fn my_permissions(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let permissions = state.permissions.user_permissions(auth.user_id).await;

    Ok(Json(DataResponse { data: permissions }))
}

/// DELETE /api/admin/permissions/cache/{user_id}
///
/// Drop a user's cached permission set so the next check reloads it, e.g.
/// after a role change.
pub async fn clear_permission_cache(
    RequirePermission { user, .. }: RequirePermission<RolesWrite>,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.permissions.clear_permission_cache(user_id).await;

    tracing::info!(user_id, cleared_by = user.user_id, "Permission cache cleared");

    Ok(StatusCode::NO_CONTENT)
}
