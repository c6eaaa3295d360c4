//! Community Dependents
//!
//! Records owned by a community, stored as documents one table per kind.

pub mod counts;
pub mod documents;
pub mod kinds;
pub(crate) mod repository;

pub use counts::DependentCounts;
pub use documents::DependentDocument;
pub use kinds::DependentKind;
