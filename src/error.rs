//! Error type shared by the link service and the HTTP layer
//!
//! Every variant renders as an [`ErrorDetails`] body with the status code of
//! its category.

use axum::{
    extract::rejection::{PathRejection, StringRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::model::ErrorDetails;
use crate::store::StoreError;

pub const INVALID_PARAMETER: &str = "Request has invalid parameters";
pub const RESOURCE_NOT_FOUND: &str = "Requested resource could not be found";
pub const CONTACT_SUPPORT_TEAM: &str = "Please contact support team";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Blank or malformed input
    #[error("{0}")]
    InvalidArgument(String),

    /// Valid input without a matching record
    #[error("{0}")]
    NotFound(String),

    /// No usable credentials on the request
    #[error("Full authentication is required to access this resource")]
    Unauthenticated,

    /// Authenticated caller without the required capability
    #[error("Access is denied")]
    AccessDenied,

    #[error("Required request body is missing")]
    MissingBody,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else that went wrong while handling the request
    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated | Error::AccessDenied => StatusCode::UNAUTHORIZED,
            Error::MissingBody | Error::Store(_) | Error::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => INVALID_PARAMETER,
            Error::NotFound(_) => RESOURCE_NOT_FOUND,
            _ => CONTACT_SUPPORT_TEAM,
        }
    }

    /// Builds the response body, tagged with a fresh random error code
    pub fn details(&self) -> ErrorDetails {
        let status = self.status();
        ErrorDetails {
            code: rand::random::<u32>() & i32::MAX as u32,
            kind: status.canonical_reason().unwrap_or_default().to_string(),
            description: self.description().to_string(),
            more_info: self.to_string(),
        }
    }
}

/// Client-side rejections become `InvalidArgument`, the rest `Unexpected`
fn from_rejection(status: StatusCode, message: String) -> Error {
    if status.is_client_error() {
        Error::InvalidArgument(message)
    } else {
        Error::Unexpected(message)
    }
}

impl From<StringRejection> for Error {
    fn from(rejection: StringRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = self.details();

        if status.is_server_error() {
            error!(error_code = details.code, error = %self, "request failed");
        } else {
            warn!(error_code = details.code, error = %self, "request rejected");
        }

        let mut response = (status, Json(details)).into_response();
        if matches!(self, Error::Unauthenticated) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"tinyurl\""),
            );
        }
        response
    }
}
