//! JSON export of the annotated sequence.

use std::path::Path;

use anyhow::{Context, Result};
use heartwatch_types::{AnnotatedReading, TimeWindow};
use serde::Serialize;

use crate::data::Summary;

/// Default file written by the `e` key.
pub const DEFAULT_EXPORT_PATH: &str = "heartwatch_export.json";

/// Everything the monitor currently shows, in one document.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub window: TimeWindow,
    pub threshold: f64,
    pub summary: Summary,
    pub readings: &'a [AnnotatedReading],
    pub anomalies: Vec<&'a AnnotatedReading>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(window: TimeWindow, threshold: f64, readings: &'a [AnnotatedReading]) -> Self {
        Self {
            window,
            threshold,
            summary: Summary::of(readings),
            readings,
            anomalies: readings.iter().filter(|r| r.is_anomaly).collect(),
        }
    }

    /// Write the document as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::data::AnomalyDetector;
    use crate::source::testing::series;

    #[test]
    fn test_export_document_shape() {
        let readings = AnomalyDetector::default()
            .detect(&series(&[70.0, 95.0, 150.0]))
            .readings;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        ExportDocument::new(TimeWindow::Last5, 20.0, &readings)
            .write_to(&path)
            .unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["window"], "5");
        assert_eq!(value["threshold"], 20.0);
        assert_eq!(value["summary"]["count"], 3);
        assert_eq!(value["summary"]["anomalies"], 2);
        assert_eq!(value["readings"].as_array().unwrap().len(), 3);
        assert_eq!(value["readings"][0]["isAnomaly"], false);
        assert_eq!(value["anomalies"][0]["heart_rate"], 95.0);
        assert_eq!(value["anomalies"][1]["timestamp"], "2024-01-01 10:00:02");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("export.json");
        assert!(ExportDocument::new(TimeWindow::Full, 20.0, &[]).write_to(&path).is_err());
    }
}
