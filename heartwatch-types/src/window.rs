//! Time window selection.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

/// How much recent history to fetch and display.
///
/// The window boundary is computed by the data service relative to its own
/// clock; the client only passes the selection through as a query
/// parameter. Values outside this set are rejected, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum TimeWindow {
    /// The entire available series.
    #[default]
    Full,
    /// The last 5 minutes.
    Last5,
    /// The last 10 minutes.
    Last10,
    /// The last 30 minutes.
    Last30,
    /// The last 60 minutes.
    Last60,
}

impl TimeWindow {
    /// Every selectable window, in display order.
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Full,
        TimeWindow::Last5,
        TimeWindow::Last10,
        TimeWindow::Last30,
        TimeWindow::Last60,
    ];

    /// The `time_range` query parameter understood by the data service.
    pub fn as_query_param(&self) -> &'static str {
        match self {
            TimeWindow::Full => "full",
            TimeWindow::Last5 => "5",
            TimeWindow::Last10 => "10",
            TimeWindow::Last30 => "30",
            TimeWindow::Last60 => "60",
        }
    }

    /// Window length in minutes, `None` for [`TimeWindow::Full`].
    pub fn minutes(&self) -> Option<u32> {
        match self {
            TimeWindow::Full => None,
            TimeWindow::Last5 => Some(5),
            TimeWindow::Last10 => Some(10),
            TimeWindow::Last30 => Some(30),
            TimeWindow::Last60 => Some(60),
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Full => "all",
            TimeWindow::Last5 => "5m",
            TimeWindow::Last10 => "10m",
            TimeWindow::Last30 => "30m",
            TimeWindow::Last60 => "60m",
        }
    }

    /// Cycle to the next window.
    pub fn next(self) -> Self {
        match self {
            TimeWindow::Full => TimeWindow::Last5,
            TimeWindow::Last5 => TimeWindow::Last10,
            TimeWindow::Last10 => TimeWindow::Last30,
            TimeWindow::Last30 => TimeWindow::Last60,
            TimeWindow::Last60 => TimeWindow::Full,
        }
    }

    /// Cycle to the previous window.
    pub fn prev(self) -> Self {
        match self {
            TimeWindow::Full => TimeWindow::Last60,
            TimeWindow::Last5 => TimeWindow::Full,
            TimeWindow::Last10 => TimeWindow::Last5,
            TimeWindow::Last30 => TimeWindow::Last10,
            TimeWindow::Last60 => TimeWindow::Last30,
        }
    }
}

/// Map a raw selection to the query parameter for the data service.
///
/// Fails closed: anything outside `full`, `5`, `10`, `30`, `60` is an
/// [`InvalidSelection`].
pub fn to_query_param(selection: &str) -> Result<&'static str, InvalidSelection> {
    selection.parse::<TimeWindow>().map(|w| w.as_query_param())
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_param())
    }
}

impl FromStr for TimeWindow {
    type Err = InvalidSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("full") {
            return Ok(TimeWindow::Full);
        }
        match trimmed.parse::<u32>() {
            Ok(minutes) => TimeWindow::try_from(minutes).map_err(|_| InvalidSelection(s.to_string())),
            Err(_) => Err(InvalidSelection(s.to_string())),
        }
    }
}

impl TryFrom<u32> for TimeWindow {
    type Error = InvalidSelection;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            5 => Ok(TimeWindow::Last5),
            10 => Ok(TimeWindow::Last10),
            30 => Ok(TimeWindow::Last30),
            60 => Ok(TimeWindow::Last60),
            other => Err(InvalidSelection(other.to_string())),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = InvalidSelection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.as_query_param().to_string()
    }
}

/// A window selection outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelection(pub String);

impl fmt::Display for InvalidSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid time window '{}' (expected full, 5, 10, 30 or 60)",
            self.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidSelection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_pass_through() {
        let params: alloc::vec::Vec<&str> =
            TimeWindow::ALL.iter().map(|w| w.as_query_param()).collect();
        assert_eq!(params, ["full", "5", "10", "30", "60"]);
    }

    #[test]
    fn parse_accepts_the_closed_set() {
        assert_eq!("full".parse::<TimeWindow>().unwrap(), TimeWindow::Full);
        assert_eq!("FULL".parse::<TimeWindow>().unwrap(), TimeWindow::Full);
        assert_eq!(" 30 ".parse::<TimeWindow>().unwrap(), TimeWindow::Last30);
        assert_eq!(TimeWindow::try_from(60).unwrap(), TimeWindow::Last60);
    }

    #[test]
    fn parse_rejects_everything_else() {
        for bad in ["", "0", "15", "-5", "5m", "all", "120"] {
            let err = bad.parse::<TimeWindow>().unwrap_err();
            assert_eq!(err.0, bad);
        }
        assert!(TimeWindow::try_from(0).is_err());
    }

    #[test]
    fn to_query_param_fails_closed() {
        assert_eq!(to_query_param("5"), Ok("5"));
        assert_eq!(to_query_param("full"), Ok("full"));
        assert_eq!(to_query_param("7"), Err(InvalidSelection("7".into())));
    }

    #[test]
    fn cycling_visits_every_window() {
        let mut w = TimeWindow::Full;
        for expected in TimeWindow::ALL.iter().skip(1) {
            w = w.next();
            assert_eq!(w, *expected);
        }
        assert_eq!(w.next(), TimeWindow::Full);
        assert_eq!(TimeWindow::Full.prev(), TimeWindow::Last60);
        assert_eq!(TimeWindow::Last5.prev().next(), TimeWindow::Last5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_query_param_form() {
        let json = serde_json::to_string(&TimeWindow::Last10).unwrap();
        assert_eq!(json, "\"10\"");
        let back: TimeWindow = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(back, TimeWindow::Full);
        assert!(serde_json::from_str::<TimeWindow>("\"11\"").is_err());
    }
}
