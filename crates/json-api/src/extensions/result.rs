//! Turning foreign errors into [`ApiError`] responses.

use std::fmt::Display;

use tracing::error;

use crate::errors::ApiError;

pub(crate) trait ResultExt<T> {
    /// Log the error under `context` and answer with an opaque 500.
    fn or_500(self, context: &str) -> Result<T, ApiError>;

    /// Answer 400 with `message`, carrying the error text as detail.
    fn or_400(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            ApiError::internal("Internal Server Error")
        })
    }

    fn or_400(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|error| ApiError::bad_request(message).with_error(error.to_string()))
    }
}
