//! Client for the heart-rate REST API.
//!
//! The service exposes two actions under `/api/heart-rate/`:
//!
//! - `GET latest_readings/?time_range=<full|5|10|30|60>[&limit=N]` returns a
//!   JSON array of `{ "timestamp": ..., "heart_rate": ... }` objects in
//!   ascending chronological order.
//! - `POST upload_csv/` accepts a multipart form with a `file` field holding
//!   CSV rows (`timestamp,heart_rate` after a header line).
//!
//! ## Example
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
//!     let readings = client.latest_readings(TimeWindow::Last10).await?;
//!     println!("Fetched {} readings", readings.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use heartwatch_types::{RawReading, TimeWindow};

use crate::ClientError;

const API_PREFIX: &str = "api/heart-rate";

/// HTTP client for the heart-rate data service.
#[derive(Debug, Clone)]
pub struct HeartRateClient {
    client: Client,
    base_url: String,
    limit: Option<u32>,
}

impl HeartRateClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HeartRateClientBuilder {
        HeartRateClientBuilder::default()
    }

    /// The service base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the readings inside `window`.
    ///
    /// Entries that do not fit the reading model are kept as
    /// [`RawReading`]s with missing fields; only a body that is not a JSON
    /// array is an error.
    pub async fn latest_readings(&self, window: TimeWindow) -> Result<Vec<RawReading>, ClientError> {
        let mut query = vec![("time_range", window.as_query_param().to_string())];
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .client
            .get(self.endpoint("latest_readings"))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        parse_readings(body)
    }

    /// Upload a CSV file for bulk ingestion.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload_csv"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: Option<ServiceMessage> = response.json().await.ok();

        if status == StatusCode::BAD_REQUEST {
            let reason = body
                .and_then(|b| b.error)
                .unwrap_or_else(|| "bad request".to_string());
            return Err(ClientError::Rejected(reason));
        }

        if !status.is_success() {
            return Err(ClientError::Http(format!("API returned status {}", status)));
        }

        Ok(UploadReceipt {
            message: body.and_then(|b| b.message),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/{}/", self.base_url, API_PREFIX, action)
    }
}

/// Builder for [`HeartRateClient`].
#[derive(Debug, Default)]
pub struct HeartRateClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    limit: Option<u32>,
}

impl HeartRateClientBuilder {
    /// Set the service base URL (default: "http://localhost:8000").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cap the number of readings the service returns.
    pub fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HeartRateClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder().timeout(timeout).build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HeartRateClient {
            client,
            base_url,
            limit: self.limit,
        })
    }
}

/// Result of a successful CSV upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Confirmation text returned by the service, if any.
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a `latest_readings` body.
///
/// The body must be an array; each element is decoded leniently so that a
/// single bad entry does not poison the whole response.
pub fn parse_readings(body: Value) -> Result<Vec<RawReading>, ClientError> {
    let Value::Array(items) = body else {
        return Err(ClientError::Parse(format!(
            "expected a JSON array of readings, got {}",
            json_kind(&body)
        )));
    };

    Ok(items
        .iter()
        .map(|item| RawReading {
            timestamp: item.get("timestamp").and_then(Value::as_str).map(str::to_string),
            heart_rate: item.get("heart_rate").and_then(Value::as_f64),
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let client = HeartRateClient::builder().build().unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.limit, None);
    }

    #[test]
    fn test_builder_custom() {
        let client = HeartRateClient::builder()
            .base_url("http://vitals.local:9000/")
            .limit(Some(250))
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://vitals.local:9000");
        assert_eq!(client.limit, Some(250));
    }

    #[test]
    fn test_endpoints() {
        let client = HeartRateClient::builder().build().unwrap();
        assert_eq!(
            client.endpoint("latest_readings"),
            "http://localhost:8000/api/heart-rate/latest_readings/"
        );
        assert_eq!(
            client.endpoint("upload_csv"),
            "http://localhost:8000/api/heart-rate/upload_csv/"
        );
    }

    #[test]
    fn test_parse_readings_keeps_order() {
        let body = json!([
            {"timestamp": "2024-01-01 10:00:00", "heart_rate": 70.0},
            {"timestamp": "2024-01-01 10:00:05", "heart_rate": 72},
        ]);
        let readings = parse_readings(body).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp.as_deref(), Some("2024-01-01 10:00:00"));
        assert_eq!(readings[1].heart_rate, Some(72.0));
    }

    #[test]
    fn test_parse_readings_lenient_entries() {
        let body = json!([
            {"timestamp": "t0", "heart_rate": "fast"},
            {"heart_rate": 80.0},
            42,
        ]);
        let readings = parse_readings(body).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].heart_rate, None);
        assert_eq!(readings[1].timestamp, None);
        assert_eq!(readings[2], RawReading::default());
    }

    #[test]
    fn test_parse_readings_rejects_non_array() {
        let err = parse_readings(json!({"detail": "Not found."})).unwrap_err();
        assert!(matches!(err, ClientError::Parse(ref msg) if msg.contains("an object")));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client = HeartRateClient::builder()
            .base_url("http://127.0.0.1:9")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = client.latest_readings(TimeWindow::Full).await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }
}
