//! Error types for status API requests.

use thiserror::Error;

/// Errors that can occur while fetching homework statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// The request never produced an HTTP response.
    #[error("API request failed. Request: {request}. Cause: {source}")]
    Transport {
        request: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than 200 OK.
    #[error(
        "API did not return 200. Status: {status}. Reason: {reason}. Body: {body}. Request: {request}"
    )]
    WrongStatus {
        status: u16,
        reason: String,
        body: String,
        request: String,
    },

    #[error("API returned a body that is not JSON: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Short name of the error class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidEndpoint { .. } | ApiError::Client(_) => "client_setup",
            ApiError::Transport { .. } => "transport_failure",
            ApiError::WrongStatus { .. } => "wrong_response_status",
            ApiError::InvalidBody(_) => "malformed_response",
        }
    }

    /// Returns true if the failure happened before the API answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Result type for status API operations.
pub type ApiResult<T> = Result<T, ApiError>;
