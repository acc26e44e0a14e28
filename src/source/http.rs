//! HTTP-backed collaborators.

use async_trait::async_trait;
use heartwatch_client::{ClientError, HeartRateClient, RawReading, UploadReceipt};
use heartwatch_types::TimeWindow;

use super::{CsvUploader, ReadingsSource};

#[async_trait]
impl ReadingsSource for HeartRateClient {
    async fn latest_readings(&self, window: TimeWindow) -> Result<Vec<RawReading>, ClientError> {
        HeartRateClient::latest_readings(self, window).await
    }

    fn description(&self) -> &str {
        self.base_url()
    }
}

#[async_trait]
impl CsvUploader for HeartRateClient {
    async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        HeartRateClient::upload_csv(self, file_name, contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_description_is_base_url() {
        let client = HeartRateClient::builder()
            .base_url("http://vitals.local:8000/")
            .build()
            .unwrap();
        let source: &dyn ReadingsSource = &client;
        assert_eq!(source.description(), "http://vitals.local:8000");
    }
}
