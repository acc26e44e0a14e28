//! Readings and Anomalies table views.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use heartwatch_types::AnnotatedReading;

use crate::app::App;

/// Render every reading in the active window.
pub fn render_readings(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Readings ({}) [window {}]",
        app.state.readings.len(),
        app.state.window.label()
    );
    render_table(frame, app, area, &app.state.readings, app.readings_offset, title);
}

/// Render only the anomalous readings.
pub fn render_anomalies(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Anomalies ({}) [|Δ| > {} bpm]",
        app.anomalies.len(),
        app.threshold
    );
    render_table(frame, app, area, &app.anomalies, app.anomalies_offset, title);
}

fn render_table(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    readings: &[AnnotatedReading],
    offset: usize,
    title: String,
) {
    if readings.is_empty() {
        let empty = Table::new(
            vec![Row::new(vec![Cell::from("No readings").style(
                Style::default().add_modifier(Modifier::DIM),
            )])],
            [Constraint::Min(10)],
        )
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Timestamp"),
        Cell::from("BPM"),
        Cell::from("Δ"),
        Cell::from("Flag"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = readings
        .iter()
        .map(|r| {
            let style = app.theme.reading_style(r.is_anomaly);
            Row::new(vec![
                Cell::from(r.timestamp.clone()),
                Cell::from(format!("{:.0}", r.heart_rate)).style(style),
                Cell::from(format_delta(r.delta)).style(style),
                Cell::from(if r.is_anomaly { "▲ anomaly" } else { "" }).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Min(10),
    ];

    let position_info = format!(" [{}/{}] ", offset + 1, readings.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!("{}{}", title, position_info))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(offset.min(readings.len() - 1)));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Signed change from the previous reading, "-" for the first one.
fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) => format!("{:+.0}", d),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(Some(25.0)), "+25");
        assert_eq!(format_delta(Some(-21.0)), "-21");
        assert_eq!(format_delta(None), "-");
    }
}
