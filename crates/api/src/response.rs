//! Shared response envelope types for API handlers.
//!
//! Entity responses use a `{ "data": ... }` envelope. Export documents,
//! import results and health checks are returned as-is.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
