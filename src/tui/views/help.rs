use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::centered_rect;

const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
    (
        "Releases",
        &[
            ("←/→  j/k", "previous / next release"),
            ("PgUp/PgDn", "jump 10 releases"),
            ("Home/End", "first / last release"),
        ],
    ),
    (
        "Metrics",
        &[
            ("Tab", "next metric"),
            ("Shift+Tab", "previous metric"),
            ("v", "switch between chart and table"),
        ],
    ),
    ("General", &[("h  F1", "show or hide this help"), ("q  Esc", "quit")]),
];

fn help_lines() -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Cyan);

    let mut lines = vec![
        Line::from(Span::styled(
            "countlines",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(title, heading)));
        for (keys, action) in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<12}"), key),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "h or Esc closes this window",
        Style::default().fg(Color::Gray),
    )));
    lines
}

/// Modal key reference drawn over the chart.
pub fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);
    let help = Paragraph::new(help_lines())
        .block(Block::default().title("Keys").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(help, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_binding_gets_a_line() {
        let bindings: usize = SECTIONS.iter().map(|(_, b)| b.len()).sum();
        // title, blank, per-section heading and trailing blank, footer
        assert_eq!(help_lines().len(), 2 + bindings + SECTIONS.len() * 2 + 1);
    }
}
