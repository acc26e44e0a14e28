//! Terminal rendering.
//!
//! ```text
//! ┌ header: latest bpm, min/avg/max, anomaly count, window, sparkline ┐
//! │ tabs:   1:Chart | 2:Readings | 3:Anomalies                        │
//! │ content (current view)                                            │
//! └ status bar / upload prompt                                        ┘
//! ```

pub mod chart;
pub mod common;
pub mod table;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(
            0,
            (area.height / 2).saturating_sub(2),
            area.width,
            5u16.min(area.height),
        );
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Chart => chart::render(frame, app, chunks[2]),
        View::Readings => table::render_readings(frame, app, chunks[2]),
        View::Anomalies => table::render_anomalies(frame, app, chunks[2]),
    }

    if app.upload_input.is_some() {
        common::render_upload_prompt(frame, app, chunks[3]);
    } else {
        common::render_status_bar(frame, app, chunks[3]);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
