//! Error types for the API client

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Inline payload was not valid base64
    #[error("inline payload is not valid base64: {0}")]
    InlineDecode(#[from] base64::DecodeError),

    /// A structured response arrived without an image payload
    #[error("the service returned no image payload")]
    NoImage,

    /// Returned image bytes were not a decodable raster image
    #[error("returned image failed to decode: {0}")]
    UndecodableImage(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ApiError::api(404, "not found").is_client_error());
        assert!(!ApiError::api(404, "not found").is_server_error());
        assert!(ApiError::api(503, "unavailable").is_server_error());
        assert!(!ApiError::config("bad url").is_client_error());
    }

    #[test]
    fn display_includes_status() {
        let message = ApiError::api(429, "slow down").to_string();
        assert!(message.contains("429"));
        assert!(message.contains("slow down"));
    }
}
