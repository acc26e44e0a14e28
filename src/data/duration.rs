//! Parsing and formatting of interval strings ("30s", "500ms", "5m").

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Suffix to milliseconds multiplier (order matters: "ms" before "m" and "s")
const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
];

/// Parse interval strings like "30s", "1.5s", "250ms", "5m", "1h".
///
/// Zero and negative intervals are rejected, as are values that round to
/// zero milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str
                .trim()
                .parse()
                .with_context(|| format!("Invalid duration: {}", s))?;
            if !val.is_finite() || val <= 0.0 {
                bail!("Duration must be positive: {}", s);
            }
            let millis = (val * multiplier).round() as u64;
            if millis == 0 {
                bail!("Duration must be at least 1ms: {}", s);
            }
            return Ok(Duration::from_millis(millis));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        let secs = d.as_secs_f64();
        if millis % 1_000 == 0 {
            format!("{}s", d.as_secs())
        } else {
            format!("{:.1}s", secs)
        }
    } else if millis % 60_000 == 0 {
        format!("{}m", d.as_secs() / 60)
    } else {
        format!("{}m{}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}

/// Human-friendly age, e.g. "just now", "12s ago", "3m ago".
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 1 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3_600)
    }
}
