//! Communities

mod errors;
pub(crate) mod handlers;
pub(crate) mod responses;

pub(crate) use errors::*;
pub(crate) use handlers::*;
