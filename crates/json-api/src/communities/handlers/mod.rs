//! Community Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod preview;
pub(crate) mod restore;
pub(crate) mod update;
