//! Route definitions for permission lookups.
//!
//! Two routers are provided:
//! - `auth_router()` for the caller's own permissions, mounted at `/auth`
//! - `admin_router()` for cache control, mounted at `/admin/permissions`

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::permissions;
use crate::state::AppState;

/// ```text
/// GET /permissions  -> my_permissions
/// ```
pub fn auth_router() -> Router<AppState> {
    Router::new().route("/permissions", get(permissions::my_permissions))
}

/// ```text
/// DELETE /cache/{user_id}  -> clear_permission_cache
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new().route(
        "/cache/{user_id}",
        delete(permissions::clear_permission_cache),
    )
}
