//! Summary statistics over an annotated sequence.

use heartwatch_types::AnnotatedReading;
use serde::Serialize;

/// Number of trailing readings shown in the header sparkline.
const SPARKLINE_SIZE: usize = 60;

/// Aggregates for the header and export.
///
/// All bpm fields are `None` for an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub anomalies: usize,
    pub latest: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Largest absolute change between consecutive readings.
    pub max_delta: Option<f64>,
}

impl Summary {
    /// Compute the summary in one pass.
    pub fn of(readings: &[AnnotatedReading]) -> Self {
        let mut summary = Summary {
            count: readings.len(),
            ..Default::default()
        };
        if readings.is_empty() {
            return summary;
        }

        let mut total = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for reading in readings {
            total += reading.heart_rate;
            min = min.min(reading.heart_rate);
            max = max.max(reading.heart_rate);
            if reading.is_anomaly {
                summary.anomalies += 1;
            }
            if let Some(delta) = reading.delta {
                let delta = delta.abs();
                summary.max_delta = Some(summary.max_delta.map_or(delta, |m: f64| m.max(delta)));
            }
        }

        summary.latest = readings.last().map(|r| r.heart_rate);
        summary.min = Some(min);
        summary.max = Some(max);
        summary.mean = Some(total / readings.len() as f64);
        summary
    }

    /// Share of readings flagged as anomalous, in percent.
    pub fn anomaly_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.anomalies as f64 / self.count as f64 * 100.0
        }
    }
}

/// Trailing heart rates normalized to 0-7 for 8 bar levels.
///
/// Returns an empty Vec if there are fewer than two readings.
pub fn sparkline(readings: &[AnnotatedReading]) -> Vec<u8> {
    if readings.len() < 2 {
        return Vec::new();
    }

    let start = readings.len().saturating_sub(SPARKLINE_SIZE);
    let values: Vec<f64> = readings[start..].iter().map(|r| r.heart_rate).collect();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1.0);

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}
