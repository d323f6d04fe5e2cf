use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

/// Line colors, cycled by series index.
pub const SERIES_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightYellow,
];

pub fn series_color(idx: usize) -> Color {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

/// Rectangle of `percent_x` by `percent_y` of `r`, centred in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let band = |direction: Direction, percent: u16, area: Rect| {
        let margin = (100 - percent) / 2;
        Layout::default()
            .direction(direction)
            .constraints([
                Constraint::Percentage(margin),
                Constraint::Percentage(percent),
                Constraint::Percentage(margin),
            ])
            .split(area)[1]
    };
    band(Direction::Horizontal, percent_x, band(Direction::Vertical, percent_y, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_popup_fits_inside() {
        let inner = centered_rect(60, 70, Rect::new(0, 0, 100, 100));
        assert_eq!((inner.x, inner.y, inner.width, inner.height), (20, 15, 60, 70));
    }

    #[test]
    fn colours_cycle() {
        assert_eq!(series_color(0), series_color(SERIES_COLORS.len()));
    }
}
