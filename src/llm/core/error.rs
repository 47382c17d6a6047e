//! Error types for the LLM layer

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when using LLM providers
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Upstream did not answer in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// SSE stream parsing failures
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded (retry after {retry_after:?})")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Provider-specific errors
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: String, message: String },
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return LlmError::Timeout(err.to_string());
        }
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}

impl LlmError {
    /// Build an error from a non-success upstream response
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: String) -> Self {
        match status {
            401 | 403 => LlmError::AuthenticationError(body),
            429 => LlmError::RateLimitExceeded { retry_after },
            _ => LlmError::HttpError { status, body },
        }
    }
}
