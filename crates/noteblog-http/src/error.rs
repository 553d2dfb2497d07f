//! HTTP error type and its JSON response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use noteblog_service::error::ServiceError;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request is malformed or lacks a required cookie/field.
    #[error("{0}")]
    BadRequest(String),

    /// Missing registry value: a deployment defect. Fails the request only.
    #[error("application value '{0}' is not configured")]
    ConfigurationMissing(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ConfigurationMissing(name) => Self::ConfigurationMissing(name),
            ServiceError::BadRequest(msg) => Self::BadRequest(msg),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Unauthorized => Self::Unauthorized,
            ServiceError::Internal(msg) | ServiceError::InvalidConfiguration(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    /// Error code (e.g. "bad_request", "configuration_missing").
    pub(crate) error: String,
    /// Human-readable error detail, if available.
    pub(crate) detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone())),
            ApiError::ConfigurationMissing(name) => {
                tracing::error!(%name, "request failed on missing application value");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_missing",
                    Some(self.to_string()),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            ApiError::Internal(msg) => {
                tracing::error!(%msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    Some(msg.clone()),
                )
            }
        };

        let body = ErrorBody {
            error: error.to_string(),
            detail,
        };

        (status, axum::Json(body)).into_response()
    }
}
