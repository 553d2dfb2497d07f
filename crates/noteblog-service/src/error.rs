//! Service-layer error types.
//!
//! `ServiceError` is transport-agnostic. The HTTP crate maps it to status
//! codes and JSON bodies.

/// Service error shared by the context facade and the account flows.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required application registry value was never registered at startup
    /// (or was registered with the wrong scalar type).
    #[error("application value '{0}' is not configured")]
    ConfigurationMissing(String),

    /// A startup setting is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Request data failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Credentials were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn configuration_missing(name: impl Into<String>) -> Self {
        Self::ConfigurationMissing(name.into())
    }
}
