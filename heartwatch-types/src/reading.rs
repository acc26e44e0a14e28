//! Heart-rate readings in their wire, validated and annotated forms.

use alloc::string::String;
use core::fmt;

/// One element of a `latest_readings` response, as decoded from the wire.
///
/// Either field may be absent when the service sent something that does
/// not fit the model (missing key, wrong JSON type). Use
/// [`RawReading::validate`] to obtain a [`Reading`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawReading {
    /// Sortable timestamp string (e.g. `"2024-01-01 12:00:00"`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<String>,

    /// Beats per minute.
    #[cfg_attr(feature = "serde", serde(default))]
    pub heart_rate: Option<f64>,
}

impl RawReading {
    /// Create a well-formed raw reading.
    pub fn new(timestamp: impl Into<String>, heart_rate: f64) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            heart_rate: Some(heart_rate),
        }
    }

    /// Check the reading against the data model.
    ///
    /// A reading is malformed when the timestamp is missing, or the heart
    /// rate is missing, non-finite, or not strictly positive.
    pub fn validate(&self) -> Result<Reading, MalformedReading> {
        let Some(timestamp) = self.timestamp.as_ref() else {
            return Err(MalformedReading::MissingTimestamp);
        };
        match self.heart_rate {
            None => Err(MalformedReading::MissingHeartRate),
            Some(bpm) if !bpm.is_finite() || bpm <= 0.0 => {
                Err(MalformedReading::InvalidHeartRate(bpm))
            }
            Some(bpm) => Ok(Reading {
                timestamp: timestamp.clone(),
                heart_rate: bpm,
            }),
        }
    }
}

impl From<Reading> for RawReading {
    fn from(reading: Reading) -> Self {
        Self {
            timestamp: Some(reading.timestamp),
            heart_rate: Some(reading.heart_rate),
        }
    }
}

/// Why a [`RawReading`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MalformedReading {
    /// No timestamp present.
    MissingTimestamp,
    /// No numeric heart rate present.
    MissingHeartRate,
    /// Heart rate is NaN, infinite, zero or negative.
    InvalidHeartRate(f64),
}

impl fmt::Display for MalformedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReading::MissingTimestamp => write!(f, "reading has no timestamp"),
            MalformedReading::MissingHeartRate => write!(f, "reading has no numeric heart_rate"),
            MalformedReading::InvalidHeartRate(bpm) => {
                write!(f, "heart_rate {} is not a positive number", bpm)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MalformedReading {}

/// A single timestamped heart-rate sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Sortable timestamp string.
    pub timestamp: String,
    /// Beats per minute, always > 0.
    pub heart_rate: f64,
}

/// A reading together with its anomaly flag.
///
/// Derived from an ordered sequence of readings; never persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotatedReading {
    /// Sortable timestamp string.
    pub timestamp: String,
    /// Beats per minute.
    pub heart_rate: f64,
    /// Change in bpm from the previous valid reading, `None` for the first.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub delta: Option<f64>,
    /// Whether the change from the previous reading exceeded the threshold.
    #[cfg_attr(feature = "serde", serde(rename = "isAnomaly"))]
    pub is_anomaly: bool,
}

impl AnnotatedReading {
    /// Annotate a reading given its predecessor's heart rate (if any) and a
    /// threshold.
    ///
    /// The comparison is strict: a change exactly equal to `threshold` is
    /// not an anomaly.
    pub fn annotate(reading: Reading, previous_bpm: Option<f64>, threshold: f64) -> Self {
        let delta = previous_bpm.map(|p| reading.heart_rate - p);
        let is_anomaly = delta.map(|d| d.abs() > threshold).unwrap_or(false);
        Self {
            timestamp: reading.timestamp,
            heart_rate: reading.heart_rate,
            delta,
            is_anomaly,
        }
    }

    /// The plain reading without annotations.
    pub fn reading(&self) -> Reading {
        Reading {
            timestamp: self.timestamp.clone(),
            heart_rate: self.heart_rate,
        }
    }
}
