//! Error types for HTTP execution.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`HttpClientService`](crate::HttpClientService).
///
/// Retryable variants are only returned once the retry budget is spent.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {timeout_secs}s ({url}, {attempts} attempt(s))")]
    Timeout {
        /// Target URL.
        url: String,
        /// Per-attempt timeout in seconds.
        timeout_secs: f64,
        /// Attempts made.
        attempts: u32,
    },

    /// Connection-level failure (DNS, refused connection, reset, broken body).
    #[error("Network error calling {url}: {message}")]
    Network {
        /// Target URL.
        url: String,
        /// Underlying error description.
        message: String,
        /// Attempts made.
        attempts: u32,
    },

    /// The server kept answering with a 5xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Target URL.
        url: String,
        /// Parsed response body, if any.
        body: Option<Value>,
        /// Attempts made.
        attempts: u32,
    },

    /// The envelope could not be turned into a request (bad URL, header, body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    /// Creates an [`InvalidRequest`](Self::InvalidRequest).
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Returns `true` for failures worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::InvalidRequest(_) => false,
        }
    }

    /// Number of attempts made before this error was returned.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Timeout { attempts, .. }
            | Self::Network { attempts, .. }
            | Self::Status { attempts, .. } => *attempts,
            Self::InvalidRequest(_) => 1,
        }
    }
}
