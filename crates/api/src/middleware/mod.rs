//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the session user from a Bearer token or the
//!   `session_token` cookie.
//! - [`permission::RequirePermission`] -- requires one named permission.

pub mod auth;
pub mod permission;
