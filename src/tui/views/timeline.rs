use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use crate::plot::Chart as SeriesChart;
use crate::tui::{series_color, TuiState};

/// Render one line per series for the current metric, plus the values at the selected release.
pub fn draw_timeline_view(f: &mut Frame, area: Rect, chart: &SeriesChart, state: &TuiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    if chart.is_empty() {
        let empty = Paragraph::new("No data to display")
            .block(Block::default().title("Line Counts Over Time").borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| s.points.iter().map(|p| (p.x, p.value as f64)).collect())
        .collect();

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(idx, (series, data))| {
            Dataset::default()
                .name(series.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(idx)))
                .data(data)
        })
        .collect();

    let (x_min, x_max) = chart.x_bounds();
    let y_max = (chart.max_value().max(1) as f64) * 1.05;
    let x_mid = (x_min + x_max) / 2.0;

    let x_labels = vec![
        Span::raw(chart.label_for(x_min)),
        Span::raw(chart.label_for(x_mid)),
        Span::raw(chart.label_for(x_max)),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", y_max / 2.0)),
        Span::raw(format!("{:.0}", y_max)),
    ];

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!("{} per release", chart.metric.label()))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("release")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.metric.label())
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );
    f.render_widget(widget, chunks[0]);

    let mut detail = Vec::new();
    if let Some(tick) = chart.ticks.get(state.selected) {
        let date = tick.date.map(|d| format!(" ({})", d.format("%Y-%m-%d"))).unwrap_or_default();
        detail.push(Line::from(vec![Span::styled(
            format!("{}{date}", tick.release),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]));
        let values: Vec<Span> = chart
            .series
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| {
                s.points.iter().find(|p| p.release == tick.release).map(|p| {
                    Span::styled(
                        format!("{}: {}  ", s.name, p.value),
                        Style::default().fg(series_color(idx)),
                    )
                })
            })
            .collect();
        detail.push(Line::from(values));
    }
    let detail_para = Paragraph::new(detail)
        .block(Block::default().title("Selected Release").borders(Borders::ALL));
    f.render_widget(detail_para, chunks[1]);
}
