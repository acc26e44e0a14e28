//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use heartwatch_types::AnnotatedReading;
use tokio::sync::mpsc;

use crate::data::{ReadingStore, Summary};
use crate::error::MonitorError;
use crate::export::ExportDocument;
use crate::poller::{PollState, PollerHandle, RefreshOutcome, WindowOutcome};
use crate::ui::Theme;
use crate::upload::{UploadCoordinator, UploadOutcome};

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Heart rate over the active window with anomalies marked.
    Chart,
    /// Every reading in the window.
    Readings,
    /// Anomalous readings only.
    Anomalies,
}

impl View {
    pub const ALL: [View; 3] = [View::Chart, View::Readings, View::Anomalies];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Chart => View::Readings,
            View::Readings => View::Anomalies,
            View::Anomalies => View::Chart,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Chart => View::Anomalies,
            View::Readings => View::Chart,
            View::Anomalies => View::Readings,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Chart => "Chart",
            View::Readings => "Readings",
            View::Anomalies => "Anomalies",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Chart => 0,
            View::Readings => 1,
            View::Anomalies => 2,
        }
    }
}

/// Something a key press asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh,
    NextWindow,
    PrevWindow,
    /// `None` when the prompt was confirmed empty.
    Upload(Option<PathBuf>),
    Export,
}

/// Sender half for finished uploads; the UI loop holds the receiver.
pub type UploadResults = mpsc::UnboundedSender<Result<UploadOutcome, MonitorError>>;

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Engine
    poller: PollerHandle,
    store: ReadingStore,
    uploads: UploadCoordinator,
    upload_results: UploadResults,
    pub upload_pending: bool,
    source_description: String,
    pub threshold: f64,

    // Latest snapshot and derived views
    pub state: Arc<PollState>,
    pub anomalies: Arc<[AnnotatedReading]>,
    pub summary: Summary,

    // Navigation state (one offset per table view)
    pub readings_offset: usize,
    pub anomalies_offset: usize,

    // Upload path prompt; `Some` while the user is typing
    pub upload_input: Option<String>,

    pub export_path: PathBuf,

    // UI (the binary swaps in the detected theme)
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        poller: PollerHandle,
        uploads: UploadCoordinator,
        upload_results: UploadResults,
        source_description: impl Into<String>,
        threshold: f64,
    ) -> Self {
        let mut store = poller.store();
        let state = store.snapshot();
        let anomalies = store.anomalies();
        let summary = Summary::of(&state.readings);

        Self {
            running: true,
            current_view: View::Chart,
            show_help: false,
            poller,
            store,
            uploads,
            upload_results,
            upload_pending: false,
            source_description: source_description.into(),
            threshold,
            state,
            anomalies,
            summary,
            readings_offset: 0,
            anomalies_offset: 0,
            upload_input: None,
            export_path: PathBuf::from(crate::export::DEFAULT_EXPORT_PATH),
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Returns a description of the data source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// A separate view of the poller state, for change notifications.
    pub fn store(&self) -> ReadingStore {
        self.poller.store()
    }

    /// Pull the latest published state from the poller.
    pub fn sync(&mut self) {
        let state = self.store.snapshot();
        if state.version != self.state.version {
            self.anomalies = self.store.anomalies();
            self.summary = Summary::of(&state.readings);
        }
        self.state = state;
        self.clamp_offsets();
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// Carry out an engine action requested by a key press.
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Refresh => match self.poller.refresh().await {
                Ok(RefreshOutcome::Started(_)) => self.set_status_message("Refreshing..."),
                Ok(RefreshOutcome::Busy) => self.set_status_message("Busy: fetch already in flight"),
                Err(e) => self.set_status_message(format!("Refresh failed: {}", e)),
            },
            Action::NextWindow => self.change_window(self.state.window.next()).await,
            Action::PrevWindow => self.change_window(self.state.window.prev()).await,
            Action::Upload(path) => self.start_upload(path),
            Action::Export => {
                let path = self.export_path.clone();
                match self.export_state(&path) {
                    Ok(()) => {
                        self.set_status_message(format!("Exported to {}", path.display()))
                    }
                    Err(e) => self.set_status_message(format!("Export failed: {}", e)),
                }
            }
        }
        self.sync();
    }

    async fn change_window(&mut self, window: heartwatch_types::TimeWindow) {
        match self.poller.set_window(window).await {
            Ok(WindowOutcome::Changed(_)) => {
                self.readings_offset = 0;
                self.anomalies_offset = 0;
                self.set_status_message(format!("Window: {}", window.label()));
            }
            Ok(WindowOutcome::Unchanged) => {}
            Err(e) => self.set_status_message(format!("Window change failed: {}", e)),
        }
    }

    fn start_upload(&mut self, path: Option<PathBuf>) {
        if self.upload_pending {
            self.set_status_message("Upload already in progress");
            return;
        }

        self.upload_pending = true;
        if let Some(path) = &path {
            self.set_status_message(format!("Uploading {}...", path.display()));
        }

        let uploads = self.uploads.clone();
        let results = self.upload_results.clone();
        tokio::spawn(async move {
            let result = uploads.upload(path.as_deref()).await;
            let _ = results.send(result);
        });
    }

    /// Report a finished upload.
    pub fn on_upload_result(&mut self, result: Result<UploadOutcome, MonitorError>) {
        self.upload_pending = false;
        match result {
            Ok(outcome) => {
                let message = outcome.message.unwrap_or_else(|| "Upload accepted".to_string());
                self.set_status_message(message);
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Write the current annotated sequence to `path` as JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        ExportDocument::new(self.state.window, self.threshold, &self.state.readings).write_to(path)
    }

    // View navigation

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    // Scrolling

    fn visible_len(&self) -> usize {
        match self.current_view {
            View::Chart => 0,
            View::Readings => self.state.readings.len(),
            View::Anomalies => self.anomalies.len(),
        }
    }

    fn offset_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::Chart => None,
            View::Readings => Some(&mut self.readings_offset),
            View::Anomalies => Some(&mut self.anomalies_offset),
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        if let Some(offset) = self.offset_mut() {
            *offset = offset.saturating_sub(n);
        }
    }

    pub fn scroll_down(&mut self, n: usize) {
        let last = self.visible_len().saturating_sub(1);
        if let Some(offset) = self.offset_mut() {
            *offset = (*offset + n).min(last);
        }
    }

    pub fn scroll_top(&mut self) {
        if let Some(offset) = self.offset_mut() {
            *offset = 0;
        }
    }

    pub fn scroll_bottom(&mut self) {
        let last = self.visible_len().saturating_sub(1);
        if let Some(offset) = self.offset_mut() {
            *offset = last;
        }
    }

    fn clamp_offsets(&mut self) {
        self.readings_offset = self
            .readings_offset
            .min(self.state.readings.len().saturating_sub(1));
        self.anomalies_offset = self.anomalies_offset.min(self.anomalies.len().saturating_sub(1));
    }

    // Upload prompt

    pub fn start_upload_prompt(&mut self) {
        self.upload_input = Some(String::new());
    }

    pub fn input_push(&mut self, c: char) {
        if let Some(input) = self.upload_input.as_mut() {
            input.push(c);
        }
    }

    pub fn input_pop(&mut self) {
        if let Some(input) = self.upload_input.as_mut() {
            input.pop();
        }
    }

    pub fn cancel_upload_prompt(&mut self) {
        self.upload_input = None;
    }

    /// Close the prompt and return the typed path, if any.
    pub fn take_upload_path(&mut self) -> Option<PathBuf> {
        let input = self.upload_input.take()?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    /// Age of the displayed data.
    pub fn data_age(&self) -> Option<Duration> {
        self.state.last_updated.map(|at| at.elapsed())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::poller::Poller;
    use crate::source::testing::{series, RecordingUploader, ScriptedSource};

    pub(crate) async fn test_app(
        source: &Arc<ScriptedSource>,
    ) -> (App, mpsc::UnboundedReceiver<Result<UploadOutcome, MonitorError>>) {
        let handle = Poller::builder()
            .interval(Duration::from_secs(3600))
            .build(source.clone())
            .start();
        let mut store = handle.store();
        store.wait_for(|s| s.counters.applied >= 1).await.unwrap();

        let uploads = UploadCoordinator::new(RecordingUploader::new(), handle.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(handle, uploads, tx, "scripted", 20.0);
        app.sync();
        (app, rx)
    }

    #[test]
    fn test_view_cycle() {
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
        }
        assert_eq!(View::Anomalies.next(), View::Chart);
    }

    #[tokio::test]
    async fn test_sync_picks_up_readings_and_anomalies() {
        let source = ScriptedSource::new();
        source.push_ok(series(&[70.0, 95.0, 150.0]));
        let (app, _rx) = test_app(&source).await;

        assert_eq!(app.state.readings.len(), 3);
        assert_eq!(app.anomalies.len(), 2);
        assert_eq!(app.summary.latest, Some(150.0));
    }

    #[tokio::test]
    async fn test_scroll_is_clamped() {
        let source = ScriptedSource::new();
        source.push_ok(series(&[70.0, 71.0, 72.0, 73.0]));
        let (mut app, _rx) = test_app(&source).await;

        app.set_view(View::Readings);
        app.scroll_down(10);
        assert_eq!(app.readings_offset, 3);
        app.scroll_up(1);
        assert_eq!(app.readings_offset, 2);
        app.scroll_top();
        assert_eq!(app.readings_offset, 0);

        app.set_view(View::Anomalies);
        app.scroll_bottom();
        assert_eq!(app.anomalies_offset, 0);
    }

    #[tokio::test]
    async fn test_window_action_changes_window() {
        let source = ScriptedSource::new();
        let (mut app, _rx) = test_app(&source).await;

        app.perform(Action::NextWindow).await;
        assert_eq!(app.state.window, heartwatch_types::TimeWindow::Last5);
        source.wait_for_calls(2).await;

        app.perform(Action::PrevWindow).await;
        assert_eq!(app.state.window, heartwatch_types::TimeWindow::Full);
    }

    #[tokio::test]
    async fn test_refresh_while_busy_reports_busy() {
        let source = ScriptedSource::new();
        source.push_ok(series(&[70.0]));
        let _gate = source.push_gated();
        let (mut app, _rx) = test_app(&source).await;

        app.perform(Action::Refresh).await;
        source.wait_for_calls(2).await;
        app.perform(Action::Refresh).await;
        assert_eq!(app.get_status_message(), Some("Busy: fetch already in flight"));
    }

    #[tokio::test]
    async fn test_upload_result_is_reported() {
        let source = ScriptedSource::new();
        let (mut app, mut rx) = test_app(&source).await;

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"timestamp,heart_rate\n").unwrap();

        app.perform(Action::Upload(Some(file.path().to_path_buf()))).await;
        assert!(app.upload_pending);

        let result = rx.recv().await.unwrap();
        app.on_upload_result(result);
        assert!(!app.upload_pending);
        assert_eq!(app.get_status_message(), Some("Data uploaded successfully"));
    }

    #[tokio::test]
    async fn test_empty_upload_prompt_reports_no_file() {
        let source = ScriptedSource::new();
        let (mut app, mut rx) = test_app(&source).await;

        app.perform(Action::Upload(None)).await;
        let result = rx.recv().await.unwrap();
        assert_eq!(result, Err(MonitorError::NoFileSelected));
        app.on_upload_result(result);
        assert_eq!(app.get_status_message(), Some("no file selected"));
    }

    #[tokio::test]
    async fn test_export_action_writes_file() {
        let source = ScriptedSource::new();
        source.push_ok(series(&[70.0, 95.0]));
        let (mut app, _rx) = test_app(&source).await;
        let dir = tempfile::tempdir().unwrap();
        app.export_path = dir.path().join("out.json");

        app.perform(Action::Export).await;
        let written = std::fs::read_to_string(&app.export_path).unwrap();
        assert!(written.contains("\"isAnomaly\": true"));
    }
}
