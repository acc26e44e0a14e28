//! Scripted in-memory collaborators for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use heartwatch_client::{ClientError, RawReading, UploadReceipt};
use heartwatch_types::TimeWindow;
use tokio::sync::{oneshot, Notify};

use super::{CsvUploader, ReadingsSource};

type FetchResult = Result<Vec<RawReading>, ClientError>;

#[derive(Debug)]
enum Scripted {
    Ready(FetchResult),
    Gated(oneshot::Receiver<FetchResult>),
    Panic,
}

/// A source that answers fetches from a script, in call order.
///
/// When the script runs dry it answers with an empty series.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<TimeWindow>>,
    called: Notify,
}

impl ScriptedSource {
    pub(crate) fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::default())
    }

    pub(crate) fn push_ok(&self, readings: Vec<RawReading>) {
        self.script.lock().unwrap().push_back(Scripted::Ready(Ok(readings)));
    }

    pub(crate) fn push_err(&self, err: ClientError) {
        self.script.lock().unwrap().push_back(Scripted::Ready(Err(err)));
    }

    /// Queue a fetch that panics instead of answering.
    pub(crate) fn push_panic(&self) {
        self.script.lock().unwrap().push_back(Scripted::Panic);
    }

    /// Queue a fetch that only completes when the returned sender fires.
    pub(crate) fn push_gated(&self) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Scripted::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self) -> Vec<TimeWindow> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `n` fetches have been made.
    pub(crate) async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if self.calls.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl ReadingsSource for ScriptedSource {
    async fn latest_readings(&self, window: TimeWindow) -> Result<Vec<RawReading>, ClientError> {
        let next = self.script.lock().unwrap().pop_front();
        self.calls.lock().unwrap().push(window);
        self.called.notify_waiters();

        match next {
            None => Ok(Vec::new()),
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Connection("gate dropped".into()))),
            Some(Scripted::Panic) => panic!("scripted fetch panic"),
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

/// An uploader that records files and answers with a fixed result.
#[derive(Debug, Default)]
pub(crate) struct RecordingUploader {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    reject_with: Mutex<Option<ClientError>>,
}

impl RecordingUploader {
    pub(crate) fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::default())
    }

    pub(crate) fn failing(err: ClientError) -> std::sync::Arc<Self> {
        let uploader = Self::default();
        *uploader.reject_with.lock().unwrap() = Some(err);
        std::sync::Arc::new(uploader)
    }

    pub(crate) fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl CsvUploader for RecordingUploader {
    async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        self.uploads.lock().unwrap().push((file_name.to_string(), contents));
        match self.reject_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(UploadReceipt {
                message: Some("Data uploaded successfully".to_string()),
            }),
        }
    }
}

/// Well-formed readings one second apart.
pub(crate) fn series(bpms: &[f64]) -> Vec<RawReading> {
    bpms.iter()
        .enumerate()
        .map(|(i, bpm)| RawReading::new(format!("2024-01-01 10:00:{:02}", i), *bpm))
        .collect()
}
