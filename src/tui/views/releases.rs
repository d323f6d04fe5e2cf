use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::plot::Chart;
use crate::tui::TuiState;
use super::{header_cell, truncate};

/// Render the current metric as a release-by-series table.
pub fn draw_releases_view(f: &mut Frame, area: Rect, chart: &Chart, state: &TuiState) {
    let mut header = vec![header_cell("Release", Color::Yellow), header_cell("Date", Color::Yellow)];
    header.extend(chart.series.iter().map(|s| header_cell(&truncate(&s.name, 14), Color::Cyan)));

    let rows: Vec<Row> = chart
        .ticks
        .iter()
        .map(|tick| {
            let mut cells = vec![
                Cell::from(tick.release.clone()),
                Cell::from(tick.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()),
            ];
            cells.extend(chart.series.iter().map(|s| {
                s.points
                    .iter()
                    .find(|p| p.release == tick.release)
                    .map(|p| Cell::from(format!("{:>12}", p.value)))
                    .unwrap_or_else(|| Cell::from(format!("{:>12}", "-")).style(Style::default().fg(Color::DarkGray)))
            }));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(16), Constraint::Length(12)];
    widths.extend(chart.series.iter().map(|_| Constraint::Length(14)));

    let table = Table::new(rows, widths)
        .header(Row::new(header))
        .block(
            Block::default()
                .title(format!("{} by release", chart.metric.label()))
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut table_state = TableState::default();
    if !chart.ticks.is_empty() {
        table_state.select(Some(state.selected.min(chart.ticks.len() - 1)));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}
