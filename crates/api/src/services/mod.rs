//! Business logic shared by the template handlers.
//!
//! - [`template_service`] -- versioned template reads and writes.
//! - [`template_sharing`] -- export documents and bulk import.

pub mod template_service;
pub mod template_sharing;
