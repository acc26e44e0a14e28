//! Read-only view of the poller's published state.

use std::sync::Arc;

use heartwatch_types::{AnnotatedReading, TimeWindow};
use tokio::sync::watch;

use crate::error::MonitorError;
use crate::poller::PollState;

/// A reader's handle onto the current annotated sequence.
///
/// Every store created from the same poller sees the same state. The
/// anomaly subsequence is derived lazily and cached until the sequence is
/// replaced.
#[derive(Debug, Clone)]
pub struct ReadingStore {
    receiver: watch::Receiver<Arc<PollState>>,
    anomalies: Option<(u64, Arc<[AnnotatedReading]>)>,
}

impl ReadingStore {
    pub(crate) fn new(receiver: watch::Receiver<Arc<PollState>>) -> Self {
        Self {
            receiver,
            anomalies: None,
        }
    }

    /// The latest published state, marking it as seen.
    pub fn snapshot(&mut self) -> Arc<PollState> {
        self.receiver.borrow_and_update().clone()
    }

    /// The current annotated sequence in server order.
    pub fn readings(&self) -> Arc<[AnnotatedReading]> {
        self.receiver.borrow().readings.clone()
    }

    /// Error from the most recent failed fetch, if any.
    pub fn last_error(&self) -> Option<MonitorError> {
        self.receiver.borrow().last_error.clone()
    }

    /// The window new fetches use.
    pub fn window(&self) -> TimeWindow {
        self.receiver.borrow().window
    }

    /// Readings flagged as anomalous, in sequence order.
    ///
    /// Recomputed only when the sequence version changes.
    pub fn anomalies(&mut self) -> Arc<[AnnotatedReading]> {
        let state = self.receiver.borrow().clone();
        if let Some((version, cached)) = &self.anomalies {
            if *version == state.version {
                return cached.clone();
            }
        }

        let flagged: Arc<[AnnotatedReading]> =
            state.readings.iter().filter(|r| r.is_anomaly).cloned().collect();
        self.anomalies = Some((state.version, flagged.clone()));
        flagged
    }

    /// Wait for the next published change.
    ///
    /// Fails with [`MonitorError::PollerStopped`] once the poller is gone.
    pub async fn changed(&mut self) -> Result<(), MonitorError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| MonitorError::PollerStopped)
    }

    /// Wait until the published state satisfies `condition`.
    pub async fn wait_for(
        &mut self,
        mut condition: impl FnMut(&PollState) -> bool,
    ) -> Result<Arc<PollState>, MonitorError> {
        let state = self
            .receiver
            .wait_for(|state| condition(&**state))
            .await
            .map_err(|_| MonitorError::PollerStopped)?;
        Ok(state.clone())
    }
}
