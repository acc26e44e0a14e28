//! Error taxonomy for the monitor.
//!
//! Nothing here is fatal: every variant degrades to "keep showing the last
//! good data" plus a recorded error for display. The type is `Clone` so it
//! can travel inside published [`PollState`](crate::poller::PollState)s.

use heartwatch_client::ClientError;
use heartwatch_types::InvalidSelection;
use thiserror::Error;

/// Errors surfaced by the ingestion engine and upload path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Fetch or upload transport failure. Retried by the next scheduled tick.
    #[error("network error: {0}")]
    Network(String),

    /// A fetch task ended without producing a result.
    #[error("fetch aborted: {0}")]
    FetchAborted(String),

    /// A time window outside the supported set.
    #[error("{0}")]
    InvalidSelection(String),

    /// The service answered with something that contains no usable readings.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Upload requested without a file.
    #[error("no file selected")]
    NoFileSelected,

    /// The service did not accept the uploaded file.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The poller has been stopped and no longer accepts commands.
    #[error("poller stopped")]
    PollerStopped,
}

impl MonitorError {
    /// Short label for the status bar.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::Network(_) => "network",
            MonitorError::FetchAborted(_) => "fetch",
            MonitorError::InvalidSelection(_) => "selection",
            MonitorError::MalformedResponse(_) => "response",
            MonitorError::NoFileSelected => "upload",
            MonitorError::UploadFailed(_) => "upload",
            MonitorError::PollerStopped => "poller",
        }
    }
}

impl From<InvalidSelection> for MonitorError {
    fn from(err: InvalidSelection) -> Self {
        MonitorError::InvalidSelection(err.to_string())
    }
}

impl From<ClientError> for MonitorError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Parse(msg) => MonitorError::MalformedResponse(msg),
            other => MonitorError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_network_or_malformed() {
        assert_eq!(
            MonitorError::from(ClientError::Timeout),
            MonitorError::Network("Request timed out".into())
        );
        assert!(matches!(
            MonitorError::from(ClientError::Parse("not an array".into())),
            MonitorError::MalformedResponse(_)
        ));
    }

    #[test]
    fn invalid_selection_keeps_message() {
        let err = MonitorError::from(InvalidSelection("15".into()));
        assert_eq!(err.kind(), "selection");
        assert!(err.to_string().contains("'15'"));
    }
}
