//! Route definitions for the email delivery check.

use axum::routing::get;
use axum::Router;

use crate::handlers::test_email;
use crate::state::AppState;

/// Routes mounted at `/test/email`.
///
/// ```text
/// GET  /  -> run_email_test
/// POST /  -> send_test_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(test_email::run_email_test).post(test_email::send_test_email),
    )
}
