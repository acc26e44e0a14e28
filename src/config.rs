//! Monitor configuration.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`)
//! 3. `HEARTWATCH_*` environment variables (e.g. `HEARTWATCH_BASE_URL`)
//! 4. Command-line flags, applied by the binary
//!
//! ```toml
//! base_url = "http://localhost:8000"
//! poll_interval = "30s"
//! request_timeout = "10s"
//! window = "full"
//! anomaly_threshold = 20.0
//! limit = 500
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use heartwatch_types::TimeWindow;
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::DEFAULT_THRESHOLD;
use crate::error::MonitorError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "HEARTWATCH";

/// Raw configuration as read from file and environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Data service base URL.
    pub base_url: String,
    /// Time between scheduled fetches, e.g. "30s".
    pub poll_interval: String,
    /// Per-request timeout, e.g. "10s".
    pub request_timeout: String,
    /// Initial time window: "full", "5", "10", "30" or "60".
    pub window: String,
    /// Beat-to-beat change (bpm) above which a reading is anomalous.
    pub anomaly_threshold: f64,
    /// Maximum readings per fetch. The service applies its own default when unset.
    pub limit: Option<u32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            poll_interval: "30s".to_string(),
            request_timeout: "10s".to_string(),
            window: "full".to_string(),
            anomaly_threshold: DEFAULT_THRESHOLD,
            limit: None,
        }
    }
}

/// Validated settings ready to build the client and poller.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub window: TimeWindow,
    pub anomaly_threshold: f64,
    pub limit: Option<u32>,
}

impl MonitorConfig {
    /// Load from an optional TOML file plus `HEARTWATCH_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Parse and check every field.
    pub fn resolve(&self) -> Result<Settings> {
        let window: TimeWindow = self
            .window
            .parse()
            .map_err(MonitorError::from)
            .context("Invalid initial window")?;

        let poll_interval = parse_duration(&self.poll_interval)
            .with_context(|| format!("Invalid poll_interval: {}", self.poll_interval))?;
        let request_timeout = parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid request_timeout: {}", self.request_timeout))?;

        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold < 0.0 {
            bail!(
                "anomaly_threshold must be a non-negative number, got {}",
                self.anomaly_threshold
            );
        }
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }

        Ok(Settings {
            base_url: self.base_url.trim().to_string(),
            poll_interval,
            request_timeout,
            window,
            anomaly_threshold: self.anomaly_threshold,
            limit: self.limit,
        })
    }
}
