//! Beat-to-beat anomaly detection.
//!
//! A reading is anomalous when its heart rate differs from the previous
//! *valid* reading by strictly more than the threshold. Malformed entries
//! are dropped from the output and never take part in a comparison.

use heartwatch_types::{AnnotatedReading, RawReading, Reading};
use tracing::trace;

/// Default bpm change that marks a reading as anomalous.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Annotates ordered readings with anomaly flags.
///
/// # Example
///
/// ```
/// use heartwatch::data::AnomalyDetector;
/// use heartwatch_types::RawReading;
///
/// let raw = vec![
///     RawReading::new("t0", 70.0),
///     RawReading::new("t1", 95.0),
///     RawReading::new("t2", 150.0),
/// ];
/// let detection = AnomalyDetector::default().detect(&raw);
/// let flags: Vec<bool> = detection.readings.iter().map(|r| r.is_anomaly).collect();
/// assert_eq!(flags, [false, true, true]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    threshold: f64,
}

/// Output of one detection pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Valid readings in input order, annotated.
    pub readings: Vec<AnnotatedReading>,
    /// Number of input entries dropped as malformed.
    pub malformed: usize,
}

impl Detection {
    /// True when the input had entries but none of them were usable.
    pub fn is_unusable(&self) -> bool {
        self.readings.is_empty() && self.malformed > 0
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AnomalyDetector {
    /// Create a detector with the given bpm threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The bpm change above which a reading is flagged.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Validate and annotate a raw response, in order.
    pub fn detect(&self, raw: &[RawReading]) -> Detection {
        let mut readings = Vec::with_capacity(raw.len());
        let mut malformed = 0;
        let mut previous_bpm = None;

        for (index, entry) in raw.iter().enumerate() {
            match entry.validate() {
                Ok(reading) => {
                    let bpm = reading.heart_rate;
                    readings.push(AnnotatedReading::annotate(reading, previous_bpm, self.threshold));
                    previous_bpm = Some(bpm);
                }
                Err(reason) => {
                    trace!(index, %reason, "dropping malformed reading");
                    malformed += 1;
                }
            }
        }

        Detection { readings, malformed }
    }

    /// Annotate readings that are already known to be valid.
    pub fn annotate(&self, readings: &[Reading]) -> Vec<AnnotatedReading> {
        let mut previous_bpm = None;
        readings
            .iter()
            .map(|reading| {
                let annotated =
                    AnnotatedReading::annotate(reading.clone(), previous_bpm, self.threshold);
                previous_bpm = Some(reading.heart_rate);
                annotated
            })
            .collect()
    }
}

/// Annotate `readings` with a given threshold, dropping malformed entries.
pub fn detect(readings: &[RawReading], threshold: f64) -> Vec<AnnotatedReading> {
    AnomalyDetector::new(threshold).detect(readings).readings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(bpms: &[f64]) -> Vec<RawReading> {
        bpms.iter()
            .enumerate()
            .map(|(i, bpm)| RawReading::new(format!("2024-01-01 10:00:{:02}", i), *bpm))
            .collect()
    }

    fn flags(readings: &[AnnotatedReading]) -> Vec<bool> {
        readings.iter().map(|r| r.is_anomaly).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(detect(&[], DEFAULT_THRESHOLD).is_empty());

        let single = detect(&series(&[180.0]), DEFAULT_THRESHOLD);
        assert_eq!(single.len(), 1);
        assert!(!single[0].is_anomaly);
    }

    #[test]
    fn test_first_reading_never_flagged() {
        for first in [1.0, 70.0, 300.0] {
            let out = detect(&series(&[first, first + 1.0]), DEFAULT_THRESHOLD);
            assert!(!out[0].is_anomaly);
        }
    }

    #[test]
    fn test_spike_is_flagged() {
        let out = detect(&series(&[70.0, 95.0, 150.0]), DEFAULT_THRESHOLD);
        assert_eq!(flags(&out), [false, true, true]);
        assert_eq!(out[1].delta, Some(25.0));
        assert_eq!(out[2].delta, Some(55.0));
    }

    #[test]
    fn test_gentle_series_has_no_anomalies() {
        let out = detect(&series(&[70.0, 85.0, 90.0]), DEFAULT_THRESHOLD);
        assert_eq!(flags(&out), [false, false, false]);
    }

    #[test]
    fn test_threshold_boundary() {
        let out = detect(&series(&[60.0, 80.0, 101.0, 81.0, 60.0]), DEFAULT_THRESHOLD);
        // +20, +21, -20, -21
        assert_eq!(flags(&out), [false, false, true, false, true]);
    }

    #[test]
    fn test_custom_threshold() {
        let detector = AnomalyDetector::new(5.0);
        let out = detector.detect(&series(&[70.0, 76.0, 80.0])).readings;
        assert_eq!(flags(&out), [false, true, false]);
        assert_eq!(detector.threshold(), 5.0);
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let mut raw = series(&[70.0, 0.0, 95.0]);
        raw[1].heart_rate = None;

        let detection = AnomalyDetector::default().detect(&raw);
        assert_eq!(detection.malformed, 1);
        assert_eq!(detection.readings.len(), 2);
        // Compared across the gap: 95 - 70 = 25
        assert_eq!(detection.readings[1].timestamp, "2024-01-01 10:00:02");
        assert_eq!(detection.readings[1].delta, Some(25.0));
        assert!(detection.readings[1].is_anomaly);
    }

    #[test]
    fn test_malformed_does_not_become_baseline() {
        // The bogus 500 would make the last reading look calm if it were used
        let raw = vec![
            RawReading::new("t0", 70.0),
            RawReading {
                timestamp: None,
                heart_rate: Some(500.0),
            },
            RawReading::new("t2", 72.0),
        ];
        let out = detect(&raw, DEFAULT_THRESHOLD);
        assert_eq!(out.len(), 2);
        assert_eq!(flags(&out), [false, false]);
    }

    #[test]
    fn test_leading_malformed_entry() {
        let raw = series(&[-1.0, 70.0, 140.0]);

        let out = detect(&raw, DEFAULT_THRESHOLD);
        assert_eq!(out.len(), 2);
        assert!(!out[0].is_anomaly);
        assert!(out[0].delta.is_none());
        assert!(out[1].is_anomaly);
    }

    #[test]
    fn test_all_malformed_is_unusable() {
        let raw = vec![RawReading::default(), RawReading::default()];
        let detection = AnomalyDetector::default().detect(&raw);
        assert!(detection.is_unusable());
        assert!(!AnomalyDetector::default().detect(&[]).is_unusable());
    }

    #[test]
    fn test_annotate_valid_readings() {
        let readings: Vec<Reading> = series(&[70.0, 95.0])
            .iter()
            .map(|r| r.validate().unwrap())
            .collect();
        let out = AnomalyDetector::default().annotate(&readings);
        assert_eq!(flags(&out), [false, true]);
    }

    #[test]
    fn test_order_is_preserved_without_sorting() {
        let raw = vec![RawReading::new("b", 70.0), RawReading::new("a", 71.0)];
        let out = detect(&raw, DEFAULT_THRESHOLD);
        assert_eq!(out[0].timestamp, "b");
        assert_eq!(out[1].timestamp, "a");
    }
}
