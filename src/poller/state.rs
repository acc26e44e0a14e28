//! The poller's published state.

use std::sync::Arc;

use heartwatch_types::{AnnotatedReading, TimeWindow};
use tokio::time::Instant;

use crate::error::MonitorError;

/// Lifecycle phase of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next tick or command.
    Idle,
    /// At least one fetch is outstanding.
    Fetching,
    /// The most recent completed fetch failed. Cleared by the next success.
    Errored,
}

/// Running totals, mostly for the status bar and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCounters {
    /// Fetches initiated (timer, manual, window change, upload).
    pub started: u64,
    /// Responses that replaced the sequence.
    pub applied: u64,
    /// Responses that failed or were unusable.
    pub failed: u64,
    /// Responses dropped because a newer one had already been applied, or
    /// because they were requested before a window change.
    pub discarded: u64,
}

/// Point-in-time view of the poller, published after every change.
///
/// Only the poll task creates these; readers hold them behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PollState {
    /// Bumped every time `readings` is replaced.
    pub version: u64,
    /// Annotated sequence from the last applied fetch.
    pub readings: Arc<[AnnotatedReading]>,
    /// Whether any fetch is outstanding.
    pub in_flight: bool,
    /// Error from the most recent failed fetch, cleared on success.
    pub last_error: Option<MonitorError>,
    /// Window used for new fetches.
    pub window: TimeWindow,
    /// Window `readings` was fetched with (`None` before the first).
    pub applied_window: Option<TimeWindow>,
    /// When `readings` was last replaced.
    pub last_updated: Option<Instant>,
    /// Sequence number of the fetch behind `readings` (0 before the first).
    pub applied_seq: u64,
    pub counters: PollCounters,
}

impl PollState {
    pub(crate) fn new(window: TimeWindow) -> Self {
        Self {
            version: 0,
            readings: Arc::from(Vec::new()),
            in_flight: false,
            last_error: None,
            window,
            applied_window: None,
            last_updated: None,
            applied_seq: 0,
            counters: PollCounters::default(),
        }
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Fetching
        } else if self.last_error.is_some() {
            Phase::Errored
        } else {
            Phase::Idle
        }
    }

    /// Whether any fetch has been applied yet.
    pub fn has_data(&self) -> bool {
        self.version > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase() {
        let mut state = PollState::new(TimeWindow::Full);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.has_data());

        state.in_flight = true;
        state.last_error = Some(MonitorError::Network("refused".into()));
        assert_eq!(state.phase(), Phase::Fetching);

        state.in_flight = false;
        assert_eq!(state.phase(), Phase::Errored);
    }
}
