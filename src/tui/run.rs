use std::io;
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::{Frame, Terminal};

use super::state::{TuiState, ViewMode};
use super::views::{draw_help_overlay, draw_releases_view, draw_timeline_view};
use crate::model::{Metric, ResultsTable};
use crate::plot::{build_chart, Chart, GroupBy};

/// Interactive chart over a loaded table. Blocks until the user quits.
pub fn run(table: &ResultsTable, group_by: GroupBy, languages: &[String], metric: Metric) -> io::Result<()> {
    // one chart per metric so Tab only swaps which one is drawn
    let charts: Vec<Chart> = Metric::ALL
        .iter()
        .map(|m| build_chart(table, *m, group_by, languages))
        .collect();
    let releases = charts.first().map(|c| c.ticks.len()).unwrap_or(0);

    let mut state = TuiState::new(metric);
    state.selected = releases.saturating_sub(1);

    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &charts, &mut state, releases);

    terminal.clear()?;
    disable_raw_mode()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    charts: &[Chart],
    state: &mut TuiState,
    releases: usize,
) -> io::Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| draw(f, &charts[state.metric_index], state)) {
            tracing::error!(error = %e, "TUI draw error");
        }

        if !poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = read()? {
            if key.kind == KeyEventKind::Press && !handle_key(state, key.code, releases) {
                return Ok(());
            }
        }
    }
}

fn draw(f: &mut Frame, chart: &Chart, state: &TuiState) {
    let size = f.size();
    if state.show_help {
        draw_help_overlay(f, size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(size);

    let titles: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Metric"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(state.metric_index);
    f.render_widget(tabs, chunks[0]);

    match state.view_mode {
        ViewMode::Chart => draw_timeline_view(f, chunks[1], chart, state),
        ViewMode::Table => draw_releases_view(f, chunks[1], chart, state),
    }
}

/// Apply one key press. Returns false when the user asked to quit.
fn handle_key(state: &mut TuiState, code: KeyCode, releases: usize) -> bool {
    if state.show_help {
        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::F(1) => state.show_help = false,
            _ => {}
        }
        return true;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('h') | KeyCode::F(1) => state.show_help = true,
        KeyCode::Tab => state.next_metric(),
        KeyCode::BackTab => state.previous_metric(),
        KeyCode::Char('v') => state.toggle_view(),
        KeyCode::Left | KeyCode::Up | KeyCode::Char('j') => state.move_selection(-1, releases),
        KeyCode::Right | KeyCode::Down | KeyCode::Char('k') => state.move_selection(1, releases),
        KeyCode::PageUp => state.move_selection(-10, releases),
        KeyCode::PageDown => state.move_selection(10, releases),
        KeyCode::Home => state.selected = 0,
        KeyCode::End => state.selected = releases.saturating_sub(1),
        _ => {}
    }
    true
}
