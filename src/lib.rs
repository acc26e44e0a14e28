//! # heartwatch
//!
//! A terminal monitor and library for live heart-rate readings.
//!
//! The crate polls a heart-rate data service on a fixed interval, flags
//! readings whose beat-to-beat change exceeds a threshold, and shows the
//! result in an interactive terminal UI. Historical readings can be pushed
//! to the service as a CSV upload, after which the monitor refreshes at
//! once.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │  ┌─────────┐  commands  ┌──────────┐  spawn  ┌──────────────────┐ │
//! │  │   app   │───────────▶│  poller  │────────▶│ ReadingsSource   │ │
//! │  │ (state) │            │  (task)  │◀────────│ (HeartRateClient)│ │
//! │  └────┬────┘            └────┬─────┘ results └──────────────────┘ │
//! │       │                      │ watch                              │
//! │       │                      ▼                                    │
//! │       │               ┌────────────┐    ┌─────────┐               │
//! │       └──────────────▶│ReadingStore│───▶│   ui    │──▶ Terminal   │
//! │                       └────────────┘    └─────────┘               │
//! │  ┌───────────────────┐                                            │
//! │  │ UploadCoordinator │──▶ CsvUploader, then poller fetch          │
//! │  └───────────────────┘                                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`poller`]**: The single owner of polling state. Runs fetches on a timer
//!   and on request, gates results by sequence number, and publishes snapshots
//! - **[`data`]**: Anomaly detection, the read-only [`ReadingStore`], summary
//!   statistics and interval parsing
//! - **[`source`]**: Collaborator traits ([`ReadingsSource`], [`CsvUploader`])
//!   implemented by [`HeartRateClient`](heartwatch_client::HeartRateClient)
//! - **[`upload`]**: The [`UploadCoordinator`]
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the service on localhost:8000, last 10 minutes
//! heartwatch --window 10
//!
//! # Use a config file and log to a file
//! heartwatch --config heartwatch.toml --log-file heartwatch.log
//!
//! # Fetch once and write the annotated readings to JSON
//! heartwatch --export readings.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use heartwatch::{Poller, UploadCoordinator};
//! use heartwatch_client::HeartRateClient;
//! use heartwatch_types::TimeWindow;
//!
//! # tokio_test::block_on(async {
//! let client = Arc::new(HeartRateClient::builder().build().unwrap());
//! let poller = Poller::builder()
//!     .window(TimeWindow::Last30)
//!     .threshold(25.0)
//!     .build(client.clone())
//!     .start();
//!
//! let mut store = poller.store();
//! store.changed().await.unwrap();
//! for reading in store.anomalies().iter() {
//!     println!("{} {} bpm", reading.timestamp, reading.heart_rate);
//! }
//!
//! let uploads = UploadCoordinator::new(client, poller.clone());
//! uploads.upload(Some(Path::new("history.csv"))).await.unwrap();
//! poller.stop().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod poller;
pub mod source;
pub mod ui;
pub mod upload;

// Re-export main types for convenience
pub use app::App;
pub use config::{MonitorConfig, Settings};
pub use data::{detect, AnomalyDetector, ReadingStore, Summary};
pub use error::MonitorError;
pub use poller::{PollState, Poller, PollerHandle, RefreshOutcome, WindowOutcome};
pub use source::{CsvUploader, ReadingsSource};
pub use upload::{UploadCoordinator, UploadOutcome};
