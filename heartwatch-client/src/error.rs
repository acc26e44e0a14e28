//! Error types for the data service client.

use thiserror::Error;

/// Errors that can occur when talking to the heart-rate data service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed or returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service refused the request and said why.
    #[error("Rejected by service: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// Whether the failure happened below HTTP (connect/timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ClientError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            ClientError::Rejected("No file uploaded".into()).to_string(),
            "Rejected by service: No file uploaded"
        );
    }

    #[test]
    fn transport_classification() {
        assert!(ClientError::Timeout.is_transport());
        assert!(ClientError::Connection("refused".into()).is_transport());
        assert!(!ClientError::Parse("bad".into()).is_transport());
    }
}
