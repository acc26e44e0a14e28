//! Data processing for heart rate readings.
//!
//! ## Submodules
//!
//! - [`detector`]: Anomaly detection over an ordered series ([`AnomalyDetector`])
//! - [`duration`]: Parsing and formatting of interval strings (e.g., "30s", "500ms")
//! - [`stats`]: Summary statistics and sparklines for the header
//! - [`store`]: Shared read view of the poller's state ([`ReadingStore`])
//!
//! ## Data Flow
//!
//! ```text
//! Vec<RawReading> (JSON from the service)
//!        │
//!        ▼
//! AnomalyDetector::detect()
//!        │
//!        ├──▶ dropped malformed entries (counted)
//!        │
//!        └──▶ Vec<AnnotatedReading> ──▶ PollState ──▶ ReadingStore
//!                                                        │
//!                                                        ├──▶ anomalies() (cached)
//!                                                        └──▶ Summary::of()
//! ```

pub mod detector;
pub mod duration;
pub mod stats;
pub mod store;

pub use detector::{detect, AnomalyDetector, Detection, DEFAULT_THRESHOLD};
pub use stats::Summary;
pub use store::ReadingStore;
