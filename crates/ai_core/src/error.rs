//! Inference errors

use thiserror::Error;

/// Errors that can occur when talking to the engine
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The engine did not answer in time
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Nothing accepted the connection
    #[error("Failed to connect to {base_url}. Is the service running?")]
    ConnectionFailed { base_url: String },

    /// The engine answered with a non-success status
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    /// The body did not have the expected shape
    #[error("Unexpected response format: {0}")]
    InvalidResponse(String),

    /// Any other transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl InferenceError {
    /// Classify a transport error
    pub fn from_transport(err: &reqwest::Error, base_url: &str, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed {
                base_url: base_url.to_string(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_message_hints_at_service() {
        let err = InferenceError::ConnectionFailed {
            base_url: "http://127.0.0.1:8002".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to http://127.0.0.1:8002. Is the service running?"
        );
    }

    #[test]
    fn http_message_contains_status_and_body() {
        let err = InferenceError::Http {
            status: 400,
            body: "bad video".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error: 400 - bad video");
    }

    #[test]
    fn timeout_message() {
        assert_eq!(
            InferenceError::Timeout(300_000).to_string(),
            "Request timed out after 300000ms"
        );
    }
}
