//! JSON error responses.

use salvo::{
    http::StatusCode,
    oapi::{
        Components, Content, EndpointOutRegister, Operation, Response as OapiResponse, ToSchema,
    },
    prelude::{Json, Response},
    writing::Scribe,
};
use serde::{Deserialize, Serialize};

use townhall_app::auth::Role;

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    /// Always `false`.
    pub success: bool,

    /// Human readable reason.
    pub message: String,

    /// Underlying failure, when it is safe to expose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Permission the route needs (403 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,

    /// Role of the caller (403 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
}

/// A status code paired with an [`ErrorBody`].
#[derive(Debug)]
pub(crate) struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                message: message.into(),
                error: None,
                required: None,
                user_role: None,
            },
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn forbidden(required: &str, role: Role) -> Self {
        let mut error = Self::new(StatusCode::FORBIDDEN, "Insufficient permissions");

        error.body.required = Some(required.to_string());
        error.body.user_role = Some(role.to_string());

        error
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.body.error = Some(error.into());
        self
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.body));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Invalid request"),
            (StatusCode::UNAUTHORIZED, "Missing or invalid API token"),
            (StatusCode::FORBIDDEN, "Insufficient permissions"),
            (StatusCode::NOT_FOUND, "Not found"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ] {
            operation.responses.insert(
                status.as_str(),
                OapiResponse::new(description).add_content(
                    "application/json",
                    Content::new(ErrorBody::to_schema(components)),
                ),
            );
        }
    }
}
