//! External delivery channels.
//!
//! Both channels report failures as typed errors; callers in this crate log
//! them and carry on.

pub mod email;
pub mod slack;
