//! Error types for remote release-service calls

use publisher_utils::{HttpError, Interrupted};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed resource does not exist (HTTP 404)
    #[error("{0} not found")]
    NotFound(String),

    #[error("remote returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[source] HttpError),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

/// Result type for remote release-service calls
pub type Result<T> = std::result::Result<T, ServiceError>;
