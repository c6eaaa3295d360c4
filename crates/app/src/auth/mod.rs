//! Authentication

mod errors;
mod models;
pub mod permissions;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub use permissions::{Role, has_permission};
pub use repository::PgAuthRepository;
pub use service::*;
pub use token::*;
