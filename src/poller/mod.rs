//! Scheduled polling of the data service.
//!
//! The poller is a single tokio task that owns [`PollState`]. It is driven
//! by three event sources:
//!
//! ```text
//!  interval tick ──┐
//!  PollerHandle ───┼──▶ poll loop ──spawn──▶ fetch task ──┐
//!  completions ◀───┼────────────────────────────────────────┘
//!                  │
//!                  └──▶ watch::Sender<Arc<PollState>> ──▶ ReadingStore(s)
//! ```
//!
//! Fetches run in their own tasks so the loop never waits on the network.
//! Each fetch is tagged with a sequence number when it starts; a response is
//! applied only if its number is higher than the last applied one, so a slow
//! stale request can never overwrite newer data. A window change also raises
//! a floor: responses requested before it belong to the old window and are
//! dropped whatever their outcome.

mod guard;
mod state;

pub use state::{Phase, PollCounters, PollState};

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use heartwatch_client::RawReading;
use heartwatch_types::TimeWindow;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data::{AnomalyDetector, ReadingStore};
use crate::error::MonitorError;
use crate::source::ReadingsSource;
use guard::InFlight;

/// Default time between scheduled fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configures and starts the poll loop.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use heartwatch::Poller;
/// use heartwatch_client::HeartRateClient;
///
/// # tokio_test::block_on(async {
/// let client = Arc::new(HeartRateClient::builder().build().unwrap());
/// let handle = Poller::builder()
///     .interval(Duration::from_secs(30))
///     .build(client)
///     .start();
///
/// let mut store = handle.store();
/// store.changed().await.unwrap();
/// println!("{} readings", store.readings().len());
/// handle.stop().await;
/// # });
/// ```
#[derive(Debug)]
pub struct Poller {
    source: Arc<dyn ReadingsSource>,
    interval: Duration,
    window: TimeWindow,
    detector: AnomalyDetector,
}

impl Poller {
    /// Create a builder for configuring the poller.
    pub fn builder() -> PollerBuilder {
        PollerBuilder::default()
    }

    /// Start the poll loop on the current tokio runtime.
    ///
    /// The first fetch happens immediately; later ones on every interval
    /// tick. The loop runs until [`PollerHandle::stop`] is called or every
    /// handle has been dropped.
    pub fn start(self) -> PollerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Arc::new(PollState::new(self.window)));

        info!(
            source = self.source.description(),
            interval = ?self.interval,
            window = %self.window,
            threshold = self.detector.threshold(),
            "starting poller"
        );

        let task = PollTask {
            source: self.source,
            detector: self.detector,
            window: self.window,
            next_seq: 0,
            last_applied: 0,
            window_floor: 0,
            in_flight: InFlight::default(),
            state: PollState::new(self.window),
            publisher: state_tx,
            completions: completion_tx,
        };

        tokio::spawn(task.run(self.interval, command_rx, completion_rx));

        PollerHandle {
            commands: command_tx,
            state: state_rx,
        }
    }
}

/// Builder for [`Poller`].
#[derive(Debug, Default)]
pub struct PollerBuilder {
    interval: Option<Duration>,
    window: Option<TimeWindow>,
    detector: Option<AnomalyDetector>,
}

impl PollerBuilder {
    /// Set the time between scheduled fetches (default: 30 seconds).
    ///
    /// A zero interval keeps the default.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the initial time window (default: full series).
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the anomaly threshold in bpm (default: 20).
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.detector = Some(AnomalyDetector::new(threshold));
        self
    }

    /// Build the poller around a readings source.
    pub fn build(self, source: Arc<dyn ReadingsSource>) -> Poller {
        Poller {
            source,
            interval: self
                .interval
                .filter(|interval| !interval.is_zero())
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            window: self.window.unwrap_or_default(),
            detector: self.detector.unwrap_or_default(),
        }
    }
}

/// Result of a manual refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch was started with this sequence number.
    Started(u64),
    /// A fetch is already in flight; nothing was started or queued.
    Busy,
}

/// Result of a window change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// The window changed and a fetch was started with this sequence number.
    Changed(u64),
    /// The requested window was already active.
    Unchanged,
}

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Timer,
    Manual,
    WindowChange,
    Upload,
}

#[derive(Debug)]
enum Command {
    Refresh(oneshot::Sender<RefreshOutcome>),
    SetWindow(TimeWindow, oneshot::Sender<WindowOutcome>),
    FetchNow(oneshot::Sender<u64>),
    Stop(oneshot::Sender<()>),
}

/// Handle for controlling a running poller.
///
/// Cheap to clone. When the last handle is dropped the poller stops.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Arc<PollState>>,
}

impl PollerHandle {
    /// A read-only view of the poller's state.
    pub fn store(&self) -> ReadingStore {
        ReadingStore::new(self.state.clone())
    }

    /// Request an immediate fetch on behalf of the user.
    ///
    /// Rejected with [`RefreshOutcome::Busy`] while any fetch is in flight.
    pub async fn refresh(&self) -> Result<RefreshOutcome, MonitorError> {
        self.request(Command::Refresh).await
    }

    /// Switch to `window` and fetch it immediately.
    pub async fn set_window(&self, window: TimeWindow) -> Result<WindowOutcome, MonitorError> {
        self.request(|reply| Command::SetWindow(window, reply)).await
    }

    /// Parse a raw selection and switch to it.
    ///
    /// An invalid selection is rejected before reaching the poller; the
    /// active window is left as it was.
    pub async fn select_window(&self, selection: &str) -> Result<WindowOutcome, MonitorError> {
        let window: TimeWindow = selection.parse()?;
        self.set_window(window).await
    }

    /// Start a fetch with the active window regardless of in-flight state.
    ///
    /// Returns the sequence number of the new fetch.
    pub async fn fetch_now(&self) -> Result<u64, MonitorError> {
        self.request(Command::FetchNow).await
    }

    /// Stop the poller.
    ///
    /// Cancels the timer. Fetches already in flight run to completion but
    /// their results are discarded. Calling this on a stopped poller is a
    /// no-op.
    pub async fn stop(&self) {
        let _ = self.request(Command::Stop).await;
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MonitorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| MonitorError::PollerStopped)?;
        reply_rx.await.map_err(|_| MonitorError::PollerStopped)
    }
}

#[derive(Debug)]
struct Completion {
    seq: u64,
    window: TimeWindow,
    result: Result<Vec<RawReading>, MonitorError>,
}

/// The single mutator of [`PollState`].
struct PollTask {
    source: Arc<dyn ReadingsSource>,
    detector: AnomalyDetector,
    window: TimeWindow,
    next_seq: u64,
    last_applied: u64,
    /// First sequence number fetched with the active window.
    window_floor: u64,
    in_flight: InFlight,
    state: PollState,
    publisher: watch::Sender<Arc<PollState>>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl PollTask {
    async fn run(
        mut self,
        interval: Duration,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let flow = match command {
                        Some(command) => self.handle(command),
                        None => {
                            self.invalidate();
                            ControlFlow::Break(())
                        }
                    };
                    if flow.is_break() {
                        break;
                    }
                }
                Some(done) = completions.recv() => self.complete(done),
                _ = ticker.tick() => {
                    self.begin_fetch(Trigger::Timer);
                }
            }
        }

        info!(
            outstanding = self.in_flight.outstanding(),
            "poller stopped"
        );
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Refresh(reply) => {
                let outcome = if self.in_flight.is_active() {
                    debug!("manual refresh rejected, fetch in flight");
                    RefreshOutcome::Busy
                } else {
                    RefreshOutcome::Started(self.begin_fetch(Trigger::Manual))
                };
                let _ = reply.send(outcome);
            }
            Command::SetWindow(window, reply) => {
                let outcome = if window == self.window {
                    WindowOutcome::Unchanged
                } else {
                    info!(from = %self.window, to = %window, "time window changed");
                    self.window = window;
                    self.state.window = window;
                    let seq = self.begin_fetch(Trigger::WindowChange);
                    self.window_floor = seq;
                    WindowOutcome::Changed(seq)
                };
                let _ = reply.send(outcome);
            }
            Command::FetchNow(reply) => {
                let _ = reply.send(self.begin_fetch(Trigger::Upload));
            }
            Command::Stop(ack) => {
                self.invalidate();
                let _ = ack.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn begin_fetch(&mut self, trigger: Trigger) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let window = self.window;
        let guard = self.in_flight.acquire();
        let source = self.source.clone();
        let completions = self.completions.clone();

        debug!(seq, %window, ?trigger, "starting fetch");

        tokio::spawn(async move {
            let fetch = tokio::spawn(async move { source.latest_readings(window).await });
            let result = match fetch.await {
                Ok(result) => result.map_err(MonitorError::from),
                Err(err) => Err(MonitorError::FetchAborted(err.to_string())),
            };
            drop(guard);
            // The loop is gone after stop; the result is dropped with the send.
            let _ = completions.send(Completion {
                seq,
                window,
                result,
            });
        });

        self.state.counters.started += 1;
        self.publish();
        seq
    }

    fn complete(&mut self, done: Completion) {
        let Completion {
            seq,
            window,
            result,
        } = done;

        if seq <= self.last_applied || seq < self.window_floor {
            debug!(
                seq,
                %window,
                last_applied = self.last_applied,
                window_floor = self.window_floor,
                "discarding stale response"
            );
            self.state.counters.discarded += 1;
            self.publish();
            return;
        }

        match result {
            Ok(raw) => {
                let detection = self.detector.detect(&raw);
                if detection.is_unusable() {
                    warn!(seq, entries = raw.len(), "response contained no usable readings");
                    self.record_failure(MonitorError::MalformedResponse(format!(
                        "all {} readings were malformed",
                        raw.len()
                    )));
                } else {
                    if detection.malformed > 0 {
                        warn!(seq, dropped = detection.malformed, "dropped malformed readings");
                    }
                    let anomalies = detection.readings.iter().filter(|r| r.is_anomaly).count();
                    debug!(
                        seq,
                        %window,
                        readings = detection.readings.len(),
                        anomalies,
                        "applying fetch"
                    );

                    self.last_applied = seq;
                    self.state.applied_seq = seq;
                    self.state.applied_window = Some(window);
                    self.state.version += 1;
                    self.state.readings = Arc::from(detection.readings);
                    self.state.last_error = None;
                    self.state.last_updated = Some(Instant::now());
                    self.state.counters.applied += 1;
                }
            }
            Err(err) => {
                warn!(seq, %window, error = %err, "fetch failed");
                self.record_failure(err);
            }
        }

        self.publish();
    }

    fn record_failure(&mut self, err: MonitorError) {
        self.state.last_error = Some(err);
        self.state.counters.failed += 1;
    }

    /// Make every outstanding sequence number stale.
    fn invalidate(&mut self) {
        self.last_applied = u64::MAX;
    }

    fn publish(&mut self) {
        self.state.in_flight = self.in_flight.is_active();
        self.publisher.send_replace(Arc::new(self.state.clone()));
    }
}
