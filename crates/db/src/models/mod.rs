//! Row structs and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Entities serialise with camelCase keys, matching the admin console.

pub mod cleanup_schedule;
pub mod cleanup_template;
pub mod monitoring_event;
pub mod permission;
