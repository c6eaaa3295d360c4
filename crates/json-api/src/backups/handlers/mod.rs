//! Backup Handlers

pub(crate) mod get;
