use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use heartwatch::app::App;
use heartwatch::data::AnomalyDetector;
use heartwatch::export::ExportDocument;
use heartwatch::ui::{self, Theme};
use heartwatch::{
    events, MonitorConfig, MonitorError, Poller, Settings, UploadCoordinator, UploadOutcome,
};
use heartwatch_client::HeartRateClient;

/// Redraw at least this often so ages and status messages stay current.
const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "heartwatch")]
#[command(about = "Real-time heart-rate monitor with beat-to-beat anomaly detection")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data service base URL (e.g., "http://localhost:8000")
    #[arg(short, long)]
    url: Option<String>,

    /// Poll interval (e.g., "30s", "5s", "1m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Request timeout (e.g., "10s")
    #[arg(long)]
    timeout: Option<String>,

    /// Initial time window: full, 5, 10, 30 or 60 minutes
    #[arg(short, long)]
    window: Option<String>,

    /// Beat-to-beat change in bpm above which a reading is anomalous
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Maximum readings per fetch
    #[arg(long)]
    limit: Option<u32>,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch once, export annotated readings to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Layer command-line flags over file and environment configuration.
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(ref url) = self.url {
            config.base_url = url.clone();
        }
        if let Some(ref interval) = self.interval {
            config.poll_interval = interval.clone();
        }
        if let Some(ref timeout) = self.timeout {
            config.request_timeout = timeout.clone();
        }
        if let Some(ref window) = self.window {
            config.window = window.clone();
        }
        if let Some(threshold) = self.threshold {
            config.anomaly_threshold = threshold;
        }
        if self.limit.is_some() {
            config.limit = self.limit;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let mut config = MonitorConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    let settings = config.resolve()?;

    let client = HeartRateClient::builder()
        .base_url(settings.base_url.clone())
        .timeout(settings.request_timeout)
        .limit(settings.limit)
        .build()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return runtime.block_on(export_to_file(&client, &settings, export_path));
    }

    runtime.block_on(run_tui(Arc::new(client), settings))
}

/// Send `tracing` output to a file, since stdout belongs to the TUI.
///
/// `RUST_LOG` takes precedence, fallback to `heartwatch=info`.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heartwatch=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI against the data service
async fn run_tui(client: Arc<HeartRateClient>, settings: Settings) -> Result<()> {
    let poller = Poller::builder()
        .interval(settings.poll_interval)
        .window(settings.window)
        .threshold(settings.anomaly_threshold)
        .build(client.clone())
        .start();
    let uploads = UploadCoordinator::new(client.clone(), poller.clone());
    let (upload_tx, upload_rx) = mpsc::unbounded_channel();

    // Detect before raw mode so the terminal query answers cleanly
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(
        poller.clone(),
        uploads,
        upload_tx,
        client.base_url(),
        settings.anomaly_threshold,
    );
    app.theme = theme;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, upload_rx).await;

    poller.stop().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut upload_results: mpsc::UnboundedReceiver<Result<UploadOutcome, MonitorError>>,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut changes = app.store();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while app.running {
        app.sync();
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            event = event_stream.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if let Some(action) = events::handle_key_event(app, key) {
                        app.perform(action).await;
                    }
                }
                Some(Ok(Event::Mouse(mouse))) => events::handle_mouse_event(app, mouse),
                // Terminal will redraw on next iteration
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            changed = changes.changed() => {
                if changed.is_err() {
                    tracing::warn!("poller went away, leaving UI loop");
                    break;
                }
            }
            Some(result) = upload_results.recv() => app.on_upload_result(result),
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

/// Fetch once and export the annotated readings to a JSON file
async fn export_to_file(client: &HeartRateClient, settings: &Settings, path: &Path) -> Result<()> {
    let raw = client
        .latest_readings(settings.window)
        .await
        .map_err(MonitorError::from)?;

    let detection = AnomalyDetector::new(settings.anomaly_threshold).detect(&raw);
    if detection.is_unusable() {
        bail!(MonitorError::MalformedResponse(format!(
            "all {} readings were malformed",
            raw.len()
        )));
    }

    ExportDocument::new(settings.window, settings.anomaly_threshold, &detection.readings)
        .write_to(path)?;

    println!(
        "Exported {} readings ({} dropped) to: {}",
        detection.readings.len(),
        detection.malformed,
        path.display()
    );
    Ok(())
}
