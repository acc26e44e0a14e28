//! Collaborator abstraction for the remote data service.
//!
//! The engine never talks HTTP directly. It calls a [`ReadingsSource`] to
//! fetch readings and a [`CsvUploader`] to push files for ingestion; the
//! production implementation of both is
//! [`HeartRateClient`](heartwatch_client::HeartRateClient).

mod http;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;

use async_trait::async_trait;
use heartwatch_client::{ClientError, RawReading, UploadReceipt};
use heartwatch_types::TimeWindow;

/// Trait for fetching readings from the data service.
///
/// Implementations must be cheap to call concurrently: the poller does not
/// coalesce overlapping fetches.
#[async_trait]
pub trait ReadingsSource: Send + Sync + Debug {
    /// Fetch the readings inside `window`, in ascending chronological order.
    ///
    /// Individual entries may be malformed; only transport failures and
    /// unusable bodies are errors.
    async fn latest_readings(&self, window: TimeWindow) -> Result<Vec<RawReading>, ClientError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// Trait for handing a CSV file to the data service for bulk ingestion.
#[async_trait]
pub trait CsvUploader: Send + Sync + Debug {
    /// Upload `contents` under `file_name`.
    async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError>;
}
