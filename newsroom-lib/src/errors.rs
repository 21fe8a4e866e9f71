//! Error types for Newsroom operations.
//!
//! Every failure the client can observe is mapped onto [`NewsroomError`] so
//! callers can decide what to show the user and whether a retry makes sense.
//! The client itself never retries.

use thiserror::Error;

/// Error codes for embedders that need a stable numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NewsroomErrorCode {
    /// Client configuration is incomplete
    NotConfigured = 1000,
    /// Unsupported digest algorithm in configuration
    UnsupportedDigest = 1001,
    /// Configuration value out of range or unparsable
    InvalidConfiguration = 1002,
    /// Request rejected before it was sent
    InvalidRequest = 2000,
    /// Remote answered with something we cannot use
    InvalidResponse = 3000,
    /// Remote unreachable or failing
    ServiceUnavailable = 4000,
    /// Subscriber/list pair unknown to the (mock) service
    NotFound = 5000,
    /// Mock store failure
    Storage = 7000,
}

/// Error type for all Newsroom client and mock operations.
#[derive(Debug, Error)]
pub enum NewsroomError {
    /// Required configuration fields are empty. Raised before any network I/O.
    #[error("newsroom client is not configured: missing {}", .missing.join(", "))]
    NotConfigured {
        /// Names of the missing fields.
        missing: Vec<&'static str>,
    },

    /// Configuration names a digest the remote API does not support.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    /// A configuration value cannot be used, such as a zero timeout.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The request itself is malformed (no email, no list IDs, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote answered, but the answer is unusable: an empty or
    /// unparseable body, no matching list entry, a 4xx status, or a
    /// transport error while reading the response.
    #[error("invalid response from newsroom: {message}")]
    InvalidResponse {
        /// What was wrong with the response.
        message: String,
        /// Underlying transport or decoding error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Any other non-success status, or the remote could not be reached.
    #[error("newsroom service unavailable: {0}")]
    ServiceUnavailable(String),

    /// No record exists for the list/email pair.
    #[error("no subscription of {email} to list {list_id}")]
    NotFound {
        /// List identifier (sv_id).
        list_id: String,
        /// Subscriber email.
        email: String,
    },

    /// Mock store lock or snapshot failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl NewsroomError {
    /// Get the numeric error code.
    pub fn code(&self) -> NewsroomErrorCode {
        match self {
            Self::NotConfigured { .. } => NewsroomErrorCode::NotConfigured,
            Self::UnsupportedDigest(_) => NewsroomErrorCode::UnsupportedDigest,
            Self::InvalidConfiguration(_) => NewsroomErrorCode::InvalidConfiguration,
            Self::InvalidRequest(_) => NewsroomErrorCode::InvalidRequest,
            Self::InvalidResponse { .. } => NewsroomErrorCode::InvalidResponse,
            Self::ServiceUnavailable(_) => NewsroomErrorCode::ServiceUnavailable,
            Self::NotFound { .. } => NewsroomErrorCode::NotFound,
            Self::Storage(_) => NewsroomErrorCode::Storage,
        }
    }

    /// Returns true if the caller may reasonably retry the operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }

    /// Create an invalid response error without an underlying cause.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid response error wrapping its cause.
    pub fn invalid_response_from<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidResponse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not found error.
    pub fn not_found(list_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::NotFound {
            list_id: list_id.into(),
            email: email.into(),
        }
    }
}

impl From<serde_json::Error> for NewsroomError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("serialization failed: {}", err))
    }
}

impl From<std::io::Error> for NewsroomError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
