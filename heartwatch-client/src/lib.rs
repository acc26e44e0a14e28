//! # heartwatch-client
//!
//! HTTP client for the heart-rate data service.
//!
//! The service stores readings and serves them back by time window; it also
//! accepts CSV files for bulk ingestion. This crate wraps both operations
//! behind [`HeartRateClient`] and decodes responses into
//! [`heartwatch_types::RawReading`]s without judging their content - that is
//! left to the anomaly engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heartwatch_client::HeartRateClient;
//! use heartwatch_types::TimeWindow;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HeartRateClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     let csv = std::fs::read("history.csv")?;
//!     client.upload_csv("history.csv", csv).await?;
//!
//!     let readings = client.latest_readings(TimeWindow::Full).await?;
//!     println!("Service now holds {} readings", readings.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;

pub use api::{parse_readings, HeartRateClient, HeartRateClientBuilder, UploadReceipt};
pub use error::ClientError;

// Re-export types for convenience
pub use heartwatch_types::{RawReading, TimeWindow};
