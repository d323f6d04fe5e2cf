use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub const SCHEMA_VERSION: u32 = 1;

/// Column order of a persisted results table.
pub const CSV_HEADER: [&str; 7] = [
    "release", "date", "language", "files", "blank", "comment", "code",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub date: Option<NaiveDate>,
}

impl Release {
    /// Build a release, deriving its date from the identifier when it encodes one.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let date = crate::release::date_from_id(&id);
        Self { id, date }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub release: String,
    pub date: Option<NaiveDate>,
    pub language: String,
    pub files: u64,
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

impl CountRow {
    pub fn key(&self) -> (&str, &str) {
        (self.release.as_str(), self.language.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Files,
    Blank,
    Comment,
    Code,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Files, Metric::Blank, Metric::Comment, Metric::Code];

    pub fn value(self, row: &CountRow) -> u64 {
        match self {
            Metric::Files => row.files,
            Metric::Blank => row.blank,
            Metric::Comment => row.comment,
            Metric::Code => row.code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Files => "files",
            Metric::Blank => "blank lines",
            Metric::Comment => "comment lines",
            Metric::Code => "code lines",
        }
    }
}

/// Rows of a single run, or the concatenation of several loaded runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsTable {
    rows: Vec<CountRow>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<CountRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CountRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: CountRow) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = CountRow>) {
        self.rows.extend(rows);
    }

    /// Append another table's rows unchanged.
    pub fn concat(&mut self, other: ResultsTable) {
        self.rows.extend(other.rows);
    }

    /// Distinct release identifiers in order of first appearance.
    pub fn releases(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.release.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// First (release, language) pair that occurs more than once, if any.
    pub fn first_duplicate(&self) -> Option<(&str, &str)> {
        let mut seen = HashSet::new();
        self.rows.iter().map(CountRow::key).find(|k| !seen.insert(*k))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFailure {
    pub release: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub table: ResultsTable,
    pub output_path: PathBuf,
    pub releases_requested: usize,
    pub releases_succeeded: usize,
    pub failures: Vec<ReleaseFailure>,
}

impl RunOutcome {
    /// A run fails only when it was given releases and none of them produced a row.
    pub fn is_success(&self) -> bool {
        self.releases_requested == 0 || !self.table.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub output_path: String,
    pub releases_requested: usize,
    pub releases_succeeded: usize,
    pub failures: Vec<ReleaseFailure>,
    pub rows: Vec<CountRow>,
}

impl RunReport {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            output_path: outcome.output_path.to_string_lossy().to_string(),
            releases_requested: outcome.releases_requested,
            releases_succeeded: outcome.releases_succeeded,
            failures: outcome.failures.clone(),
            rows: outcome.table.rows().to_vec(),
        }
    }
}
