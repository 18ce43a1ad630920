//! Per-process permission cache and checks.
//!
//! - [`cache`] -- the [`PermissionCache`] seam and its in-memory TTL map.
//! - [`checker`] -- [`PermissionChecker`], which answers "may this user do
//!   X" from the cache or the RBAC tables, failing closed on any error.

pub mod cache;
pub mod checker;

pub use cache::{InMemoryPermissionCache, PermissionCache, PermissionSet};
pub use checker::{DbPermissionLoader, PermissionChecker, PermissionLoader};
