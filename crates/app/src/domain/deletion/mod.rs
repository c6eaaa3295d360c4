//! Community Deletion & Restoration
//!
//! Deleting a community captures every record it owns into a backup and
//! removes them in the same transaction. A backup can be restored once,
//! within the retention window, under a new community uuid.

mod cascade;
pub mod data;
pub mod errors;
mod restore;
pub mod service;
mod snapshot;

pub use errors::DeletionServiceError;
pub use service::*;
