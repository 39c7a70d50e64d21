//! Error types for guard operations
//!
//! This module defines the errors that can occur while fetching effective
//! permissions and evaluating access. A failed permission fetch is its own
//! state, distinct from both "still loading" and "checked and denied", so
//! callers can tell "we don't know" apart from "you may not".

use thiserror::Error;

/// Guard error types.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Permission fetch failed at the transport level.
    #[error("Permission fetch failed: {0}")]
    FetchFailed(String),

    /// Permission service returned an error response.
    #[error("Permission service error ({status}): {message}")]
    ServiceError {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// Permission service returned a body that did not parse.
    #[error("Invalid permission response: {0}")]
    InvalidResponse(String),

    /// No identity present where one is required.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Identity present but not permitted.
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

impl GuardError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes and should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            GuardError::FetchFailed(_)
                | GuardError::ServiceError { .. }
                | GuardError::InvalidResponse(_)
                | GuardError::Internal(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Unauthenticated => 401,
            GuardError::Forbidden => 403,
            GuardError::FetchFailed(_)
            | GuardError::ServiceError { .. }
            | GuardError::InvalidResponse(_)
            | GuardError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::FetchFailed(_) => "FETCH_FAILED",
            GuardError::ServiceError { .. } => "SERVICE_ERROR",
            GuardError::InvalidResponse(_) => "INVALID_RESPONSE",
            GuardError::Unauthenticated => "UNAUTHENTICATED",
            GuardError::Forbidden => "FORBIDDEN",
            GuardError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
