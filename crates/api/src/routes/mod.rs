pub mod cleanup_schedules;
pub mod health;
pub mod permissions;
pub mod templates;
pub mod test_email;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/source-maps/templates                          list, create
/// /admin/source-maps/templates/export                   export one (GET), export many (POST)
/// /admin/source-maps/templates/import                   import (POST)
/// /admin/source-maps/templates/{id}                     get, update, delete
/// /admin/source-maps/templates/{id}/duplicate           duplicate (POST)
/// /admin/source-maps/templates/{id}/versions            version history
/// /admin/source-maps/templates/{id}/versions/{n}        one version
/// /admin/source-maps/templates/{id}/versions/{n}/restore  restore (POST)
///
/// /admin/source-maps/cleanup-schedules                  list, create
/// /admin/source-maps/cleanup-schedules/{id}             get, update, delete
///
/// /auth/permissions                                     caller's permissions
/// /admin/permissions/cache/{user_id}                    clear cached set (DELETE)
///
/// /health/deployment                                    wiring check (public)
/// /health/complete                                      configuration report (public)
/// /monitoring/health                                    database check (public)
///
/// /test/email                                           run test (GET), send (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Cleanup templates, versions, export/import.
        .nest("/admin/source-maps/templates", templates::router())
        // Cleanup schedule records.
        .nest(
            "/admin/source-maps/cleanup-schedules",
            cleanup_schedules::router(),
        )
        // Permission lookups and cache control.
        .nest("/auth", permissions::auth_router())
        .nest("/admin/permissions", permissions::admin_router())
        // Health checks.
        .nest("/health", health::api_router())
        .nest("/monitoring", health::monitoring_router())
        // Email delivery check.
        .nest("/test/email", test_email::router())
}
