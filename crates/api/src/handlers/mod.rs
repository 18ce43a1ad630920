//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers check permissions through extractors, delegate to services or
//! repositories, and map errors via [`AppError`](crate::error::AppError).

pub mod cleanup_schedules;
pub mod health;
pub mod permissions;
pub mod template_sharing;
pub mod templates;
pub mod test_email;
