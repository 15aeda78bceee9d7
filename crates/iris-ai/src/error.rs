//! Error types for iris-ai

use thiserror::Error;

/// Result type alias using iris-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a model provider
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Response parsed but did not contain what we asked for
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Check if the provider refused the request because of rate limits
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Api {
                error_type,
                message,
            } => {
                let et = error_type.to_lowercase();
                let msg = message.to_lowercase();
                et.contains("rate_limit")
                    || msg.contains("rate limit")
                    || msg.contains("too many requests")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_typed_variant() {
        assert!(Error::RateLimited { retry_after: Some(5) }.is_rate_limited());
    }

    #[test]
    fn test_rate_limited_api_error_type() {
        let e = Error::api("rate_limit_exceeded", "Slow down");
        assert!(e.is_rate_limited());
    }

    #[test]
    fn test_rate_limited_api_message() {
        let e = Error::api("error", "Too many requests");
        assert!(e.is_rate_limited());
    }

    #[test]
    fn test_not_rate_limited() {
        assert!(!Error::InvalidApiKey.is_rate_limited());
        assert!(!Error::api("invalid_request_error", "model not found").is_rate_limited());
        assert!(!Error::UnexpectedResponse("no choices".into()).is_rate_limited());
    }

    #[test]
    fn test_display_includes_message() {
        let e = Error::api("invalid_request_error", "model not found");
        assert_eq!(
            e.to_string(),
            "API error: model not found (type: invalid_request_error)"
        );
    }
}
