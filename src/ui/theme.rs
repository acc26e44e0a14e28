//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::poller::Phase;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color of the heart rate line.
    pub line: Color,
    /// Color for anomalous readings.
    pub anomaly: Color,
    /// Color for errors and failed fetches.
    pub error: Color,
    /// Color for a healthy, idle poller.
    pub healthy: Color,
    /// Color for borders and axes.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the row at the scroll offset.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            line: Color::LightBlue,
            anomaly: Color::Red,
            error: Color::Yellow,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            line: Color::Blue,
            anomaly: Color::Red,
            error: Color::Magenta,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the poller phase indicator.
    pub fn phase_style(&self, phase: Phase) -> Style {
        match phase {
            Phase::Idle => Style::default().fg(self.healthy),
            Phase::Fetching => Style::default().fg(self.highlight),
            Phase::Errored => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a reading row or point.
    pub fn reading_style(&self, is_anomaly: bool) -> Style {
        if is_anomaly {
            Style::default().fg(self.anomaly).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_rows_stand_out() {
        let theme = Theme::dark();
        assert_eq!(theme.reading_style(true).fg, Some(Color::Red));
        assert_eq!(theme.reading_style(false), Style::default());
        assert_eq!(theme.phase_style(Phase::Idle).fg, Some(Color::Green));
    }
}
