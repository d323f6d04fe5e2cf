use crate::model::Metric;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewMode {
    Chart,
    Table,
}

pub struct TuiState {
    /// Index into `Metric::ALL`.
    pub metric_index: usize,
    /// Selected release, as an index into the chart ticks.
    pub selected: usize,
    pub view_mode: ViewMode,
    pub show_help: bool,
}

impl TuiState {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric_index: Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0),
            ..Self::default()
        }
    }

    pub fn metric(&self) -> Metric {
        Metric::ALL[self.metric_index % Metric::ALL.len()]
    }

    pub fn next_metric(&mut self) {
        self.metric_index = (self.metric_index + 1) % Metric::ALL.len();
    }

    pub fn previous_metric(&mut self) {
        self.metric_index = if self.metric_index == 0 {
            Metric::ALL.len() - 1
        } else {
            self.metric_index - 1
        };
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Chart => ViewMode::Table,
            ViewMode::Table => ViewMode::Chart,
        };
    }

    /// Move the release selection by `delta`, clamped to `len` releases.
    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, len as isize - 1) as usize;
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            metric_index: Metric::ALL.len() - 1,
            selected: 0,
            view_mode: ViewMode::Chart,
            show_help: false,
        }
    }
}
