//! Route definitions for cleanup schedules.

use axum::routing::get;
use axum::Router;

use crate::handlers::cleanup_schedules;
use crate::state::AppState;

/// Schedule routes mounted at `/admin/source-maps/cleanup-schedules`.
///
/// ```text
/// GET    /      -> list_schedules
/// POST   /      -> create_schedule
/// GET    /{id}  -> get_schedule
/// PUT    /{id}  -> update_schedule
/// DELETE /{id}  -> delete_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cleanup_schedules::list_schedules).post(cleanup_schedules::create_schedule),
        )
        .route(
            "/{id}",
            get(cleanup_schedules::get_schedule)
                .put(cleanup_schedules::update_schedule)
                .delete(cleanup_schedules::delete_schedule),
        )
}
