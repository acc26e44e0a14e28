//! Chart view rendering.
//!
//! Plots heart rate against reading index with anomalous readings overlaid
//! as scatter points. The x axis is labelled with the first and last
//! timestamps of the window.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use heartwatch_types::AnnotatedReading;

use crate::app::App;

/// Headroom above and below the plotted range, in bpm.
const Y_MARGIN: f64 = 10.0;

/// Points for the heart rate line and for the anomaly overlay.
pub fn plot_points(readings: &[AnnotatedReading]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let line: Vec<(f64, f64)> = readings
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.heart_rate))
        .collect();
    let anomalies = readings
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_anomaly)
        .map(|(i, r)| (i as f64, r.heart_rate))
        .collect();
    (line, anomalies)
}

/// Y bounds covering every reading plus a margin, floored at zero.
pub fn y_bounds(readings: &[AnnotatedReading]) -> [f64; 2] {
    let min = readings.iter().map(|r| r.heart_rate).fold(f64::INFINITY, f64::min);
    let max = readings.iter().map(|r| r.heart_rate).fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 200.0];
    }
    [(min - Y_MARGIN).max(0.0).floor(), (max + Y_MARGIN).ceil()]
}

/// Time of day portion of a "YYYY-MM-DD HH:MM:SS" timestamp.
fn short_time(timestamp: &str) -> &str {
    timestamp
        .rsplit_once(|c| c == ' ' || c == 'T')
        .map(|(_, time)| time)
        .unwrap_or(timestamp)
}

/// Render the Chart view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let readings = &app.state.readings;

    let block = Block::default()
        .title(format!(
            " Heart rate [window {}] ({} readings, {} anomalies) ",
            app.state.window.label(),
            readings.len(),
            app.anomalies.len()
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if readings.is_empty() {
        let message = if app.state.has_data() {
            "No readings in this window"
        } else {
            "Waiting for first fetch..."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let (line, anomalies) = plot_points(readings);
    let [y_min, y_max] = y_bounds(readings);
    let x_max = (readings.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("bpm")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.line))
            .data(&line),
        Dataset::default()
            .name("anomaly")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(app.theme.reading_style(true))
            .data(&anomalies),
    ];

    let first = readings.first().map(|r| short_time(&r.timestamp)).unwrap_or("");
    let last = readings.last().map(|r| short_time(&r.timestamp)).unwrap_or("");
    let axis_style = Style::default().fg(app.theme.border);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .title("bpm")
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.0}", y_min)),
                    Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AnomalyDetector;
    use crate::source::testing::series;

    #[test]
    fn test_plot_points_split_anomalies() {
        let readings = AnomalyDetector::default().detect(&series(&[70.0, 95.0, 96.0])).readings;
        let (line, anomalies) = plot_points(&readings);
        assert_eq!(line, [(0.0, 70.0), (1.0, 95.0), (2.0, 96.0)]);
        assert_eq!(anomalies, [(1.0, 95.0)]);
    }

    #[test]
    fn test_y_bounds() {
        let readings = AnomalyDetector::default().detect(&series(&[62.5, 140.2])).readings;
        assert_eq!(y_bounds(&readings), [52.0, 151.0]);
        assert_eq!(y_bounds(&[]), [0.0, 200.0]);

        let low = AnomalyDetector::default().detect(&series(&[4.0])).readings;
        assert_eq!(y_bounds(&low)[0], 0.0);
    }

    #[test]
    fn test_short_time() {
        assert_eq!(short_time("2024-01-01 10:00:05"), "10:00:05");
        assert_eq!(short_time("2024-01-01T10:00:05"), "10:00:05");
        assert_eq!(short_time("10:00"), "10:00");
    }
}
