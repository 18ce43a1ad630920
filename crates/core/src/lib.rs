//! Domain types and pure business rules for the Jobs2Go source-map admin
//! service.
//!
//! Nothing in this crate touches the database or the network; the `db`,
//! `events` and `api` crates build on these types.

pub mod cleanup_schedule;
pub mod cleanup_template;
pub mod env_validation;
pub mod error;
pub mod monitoring;
pub mod permissions;
pub mod template_sharing;
pub mod types;
