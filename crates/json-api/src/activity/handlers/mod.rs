//! Activity Handlers

pub(crate) mod failed_logins;
pub(crate) mod index;
