//! Route definitions for cleanup templates.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{template_sharing, templates};
use crate::state::AppState;

/// Template routes mounted at `/admin/source-maps/templates`.
///
/// `/export` and `/import` are static segments, so they take precedence
/// over `/{id}`.
///
/// ```text
/// GET    /                                 -> list_templates
/// POST   /                                 -> create_template
/// GET    /export                           -> export_template
/// POST   /export                           -> export_templates
/// POST   /import                           -> import_templates
/// GET    /{id}                             -> get_template
/// PUT    /{id}                             -> update_template
/// DELETE /{id}                             -> delete_template
/// POST   /{id}/duplicate                   -> duplicate_template
/// GET    /{id}/versions                    -> list_versions
/// GET    /{id}/versions/{version}          -> get_version
/// POST   /{id}/versions/{version}/restore  -> restore_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/export",
            get(template_sharing::export_template).post(template_sharing::export_templates),
        )
        .route("/import", post(template_sharing::import_templates))
        .route(
            "/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/{id}/duplicate", post(templates::duplicate_template))
        .route("/{id}/versions", get(templates::list_versions))
        .route("/{id}/versions/{version}", get(templates::get_version))
        .route(
            "/{id}/versions/{version}/restore",
            post(templates::restore_version),
        )
}
