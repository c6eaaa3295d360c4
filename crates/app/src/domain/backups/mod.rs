//! Deleted Community Backups

pub mod data;
pub mod records;
pub(crate) mod repository;

pub use records::{BackupRecord, BackupStatus, BackupUuid, RestoreBlocked};
