//! Error types for the client

use thiserror::Error;

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response status was elevated to an error by the status interceptor.
    /// The display form is the response's status text, verbatim.
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Status text reported by the response
        message: String,
    },

    /// A response schema transform failed
    #[error("Schema transform failed: {0}")]
    Schema(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a status elevation error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a schema transform error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_status_text_only() {
        let err = ApiError::status(400, "Bad Request");
        assert_eq!(err.to_string(), "Bad Request");
    }

    #[test]
    fn status_classification() {
        assert!(ApiError::status(404, "Not Found").is_client_error());
        assert!(!ApiError::status(404, "Not Found").is_server_error());
        assert!(ApiError::status(503, "Service Unavailable").is_server_error());
        assert!(!ApiError::config("bad").is_client_error());
    }
}
