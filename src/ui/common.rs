//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay
//! and upload prompt.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Sparkline, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_age;
use crate::data::stats::sparkline;
use crate::poller::Phase;

/// Width reserved for the header sparkline.
const SPARKLINE_WIDTH: u16 = 24;

/// Format an optional bpm value.
pub fn format_bpm(bpm: Option<f64>) -> String {
    match bpm {
        Some(v) => format!("{:.0}", v),
        None => "-".to_string(),
    }
}

/// Render the header bar with the latest reading and window statistics.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let phase = state.phase();

    let indicator = match phase {
        Phase::Fetching => "◌",
        _ => "●",
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", indicator), app.theme.phase_style(phase)),
        Span::styled("HEARTWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    if !state.has_data() {
        spans.push(Span::raw(if state.last_error.is_some() {
            "No data yet"
        } else {
            "Loading..."
        }));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let summary = &app.summary;
    let latest_style = match state.readings.last() {
        Some(r) if r.is_anomaly => app.theme.reading_style(true),
        _ => Style::default().add_modifier(Modifier::BOLD),
    };

    spans.extend([
        Span::styled(format!("{} bpm", format_bpm(summary.latest)), latest_style),
        Span::raw(format!(
            " │ min {} avg {} max {} │ ",
            format_bpm(summary.min),
            format_bpm(summary.mean),
            format_bpm(summary.max)
        )),
        if summary.anomalies > 0 {
            Span::styled(
                format!("{}", summary.anomalies),
                Style::default().fg(app.theme.anomaly).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" anomalies │ window "),
        Span::styled(state.window.label(), Style::default().fg(app.theme.highlight)),
    ]);

    let line_width = area.width.saturating_sub(SPARKLINE_WIDTH);
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(area.x, area.y, line_width, area.height),
    );

    let bars: Vec<u64> = sparkline(&state.readings).into_iter().map(u64::from).collect();
    if !bars.is_empty() && area.width > SPARKLINE_WIDTH {
        let tail = &bars[bars.len().saturating_sub(SPARKLINE_WIDTH as usize)..];
        let spark = Sparkline::default()
            .data(tail)
            .max(7)
            .style(Style::default().fg(app.theme.line));
        frame.render_widget(
            spark,
            Rect::new(area.x + line_width, area.y, SPARKLINE_WIDTH, area.height),
        );
    }
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let label = if *view == View::Anomalies {
                format!(" {}:{} ({}) ", i + 1, view.label(), app.anomalies.len())
            } else {
                format!(" {}:{} ", i + 1, view.label())
            };
            Line::from(label)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, last error, available
/// controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.data_age() {
        Some(age) => format!("Updated {}", format_age(age)),
        None => "Waiting for data".to_string(),
    };

    if let Some(ref err) = app.state.last_error {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} error: {} ", err.kind(), err),
                Style::default().fg(app.theme.error),
            ),
            Span::styled(
                format!("| {} | r:retry ?:help q:quit", updated),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let controls = match app.current_view {
        View::Chart => "w/W:window r:refresh u:upload e:export ?:help q:quit",
        View::Readings | View::Anomalies => {
            "↑↓:scroll w/W:window r:refresh u:upload ?:help q:quit"
        }
    };

    let uploading = if app.upload_pending { " | uploading" } else { "" };
    let status = format!(
        " {} | {}{} | {}",
        app.source_description(),
        updated,
        uploading,
        controls
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the upload path prompt over the status bar.
pub fn render_upload_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref input) = app.upload_input else {
        return;
    };

    let line = Line::from(vec![
        Span::styled(" Upload CSV: ", app.theme.header),
        Span::raw(input.as_str()),
        Span::styled("█", Style::default().fg(app.theme.highlight)),
        Span::styled("  Enter:send Esc:cancel", Style::default().add_modifier(Modifier::DIM)),
    ]);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-3         Jump to view"),
        Line::from("  Tab/S-Tab   Cycle views"),
        Line::from("  ↑/↓ j/k     Scroll table"),
        Line::from("  PgUp/PgDn   Scroll 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Data"),
        Line::from("  w / W       Next/previous window"),
        Line::from("  r           Refresh now"),
        Line::from("  u           Upload a CSV file"),
        Line::from("  e           Export to JSON"),
        Line::from(""),
        section(" General"),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bpm() {
        assert_eq!(format_bpm(Some(72.4)), "72");
        assert_eq!(format_bpm(Some(115.6)), "116");
        assert_eq!(format_bpm(None), "-");
    }
}
