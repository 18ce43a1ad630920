//! Authentication primitives.
//!
//! - [`jwt`] -- verification of the HS256 session tokens issued by the
//!   identity provider.

pub mod jwt;
