//! Bulk upload of historical readings.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::MonitorError;
use crate::poller::PollerHandle;
use crate::source::CsvUploader;

/// Result of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Message returned by the service, if any.
    pub message: Option<String>,
    /// Sequence number of the fetch started after the upload, or `None` if
    /// the poller had already stopped.
    pub fetch_seq: Option<u64>,
}

/// Forwards a file to the ingestion service and refreshes the poller.
#[derive(Debug, Clone)]
pub struct UploadCoordinator {
    uploader: Arc<dyn CsvUploader>,
    poller: PollerHandle,
}

impl UploadCoordinator {
    pub fn new(uploader: Arc<dyn CsvUploader>, poller: PollerHandle) -> Self {
        Self { uploader, poller }
    }

    /// Upload the file at `path`.
    ///
    /// With no path the service is never contacted. A failed upload is
    /// reported once and not retried; a successful one starts an immediate
    /// fetch with the active window. An accepted upload is reported as such
    /// even when the poller is no longer running.
    pub async fn upload(&self, path: Option<&Path>) -> Result<UploadOutcome, MonitorError> {
        let path = path.ok_or(MonitorError::NoFileSelected)?;

        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| MonitorError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        info!(file = %file_name, bytes = contents.len(), "uploading readings");

        let receipt = self
            .uploader
            .upload_csv(&file_name, contents)
            .await
            .map_err(|e| {
                warn!(file = %file_name, error = %e, "upload failed");
                MonitorError::UploadFailed(e.to_string())
            })?;

        let fetch_seq = match self.poller.fetch_now().await {
            Ok(seq) => Some(seq),
            Err(e) => {
                warn!(file = %file_name, error = %e, "upload accepted, no refresh");
                None
            }
        };
        info!(file = %file_name, ?fetch_seq, "upload accepted");

        Ok(UploadOutcome {
            message: receipt.message,
            fetch_seq,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use heartwatch_client::ClientError;
    use heartwatch_types::TimeWindow;

    use super::*;
    use crate::poller::Poller;
    use crate::source::testing::{RecordingUploader, ScriptedSource};

    const HOUR: Duration = Duration::from_secs(3600);

    fn csv_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,heart_rate").unwrap();
        writeln!(file, "2024-01-01 10:00:00,72").unwrap();
        file
    }

    async fn running_poller(source: &Arc<ScriptedSource>) -> PollerHandle {
        let handle = Poller::builder()
            .interval(HOUR)
            .window(TimeWindow::Last10)
            .build(source.clone())
            .start();
        source.wait_for_calls(1).await;
        handle
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected_locally() {
        let source = ScriptedSource::new();
        let uploader = RecordingUploader::new();
        let coordinator = UploadCoordinator::new(uploader.clone(), running_poller(&source).await);

        let err = coordinator.upload(None).await.unwrap_err();
        assert_eq!(err, MonitorError::NoFileSelected);
        assert!(uploader.uploads().is_empty());
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_upload_triggers_one_fetch() {
        let source = ScriptedSource::new();
        let uploader = RecordingUploader::new();
        let coordinator = UploadCoordinator::new(uploader.clone(), running_poller(&source).await);
        let file = csv_file();

        let outcome = coordinator.upload(Some(file.path())).await.unwrap();
        assert_eq!(outcome.fetch_seq, Some(2));
        assert_eq!(outcome.message.as_deref(), Some("Data uploaded successfully"));

        let uploads = uploader.uploads();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].0.ends_with(".csv"));
        assert!(String::from_utf8_lossy(&uploads[0].1).contains("10:00:00,72"));

        source.wait_for_calls(2).await;
        assert_eq!(source.calls(), [TimeWindow::Last10, TimeWindow::Last10]);
    }

    #[tokio::test]
    async fn test_rejected_upload_is_not_retried() {
        let source = ScriptedSource::new();
        let uploader = RecordingUploader::failing(ClientError::Rejected("Invalid CSV".into()));
        let handle = running_poller(&source).await;
        let coordinator = UploadCoordinator::new(uploader.clone(), handle.clone());
        let file = csv_file();

        let err = coordinator.upload(Some(file.path())).await.unwrap_err();
        match err {
            MonitorError::UploadFailed(msg) => assert!(msg.contains("Invalid CSV")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(uploader.uploads().len(), 1);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.store().snapshot().counters.started, 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_upload() {
        let source = ScriptedSource::new();
        let uploader = RecordingUploader::new();
        let coordinator = UploadCoordinator::new(uploader.clone(), running_poller(&source).await);
        let dir = tempfile::tempdir().unwrap();

        let err = coordinator
            .upload(Some(&dir.path().join("missing.csv")))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::UploadFailed(_)));
        assert!(uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_after_stop_still_succeeds() {
        let source = ScriptedSource::new();
        let uploader = RecordingUploader::new();
        let handle = running_poller(&source).await;
        let coordinator = UploadCoordinator::new(uploader.clone(), handle.clone());
        handle.stop().await;

        let file = csv_file();
        let outcome = coordinator.upload(Some(file.path())).await.unwrap();
        assert_eq!(outcome.fetch_seq, None);
        assert_eq!(outcome.message.as_deref(), Some("Data uploaded successfully"));
        assert_eq!(uploader.uploads().len(), 1);
        assert_eq!(source.calls().len(), 1);
    }
}
