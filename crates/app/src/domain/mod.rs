//! Townhall Domain Concerns

pub mod audit;
pub mod backups;
pub mod communities;
pub mod deletion;
pub mod dependents;
