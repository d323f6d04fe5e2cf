use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CountlinesError>;

#[derive(Error, Debug)]
pub enum CountlinesError {
    /// The checkout tool failed or left an empty tree behind.
    #[error("Checkout of {release} failed: {reason}")]
    Checkout { release: String, reason: String },
    /// The line counter failed or its report could not be read.
    #[error("Counting {release} failed: {reason}")]
    Count { release: String, reason: String },
    /// A results file is missing or malformed.
    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid release: {0}")]
    InvalidRelease(String),
    #[error("Git repository error: {0}")]
    Git(String),
    #[error("Plot error: {0}")]
    Plot(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
}

impl CountlinesError {
    pub fn checkout(release: impl Into<String>, reason: impl Into<String>) -> Self {
        CountlinesError::Checkout {
            release: release.into(),
            reason: reason.into(),
        }
    }

    pub fn count(release: impl Into<String>, reason: impl Into<String>) -> Self {
        CountlinesError::Count {
            release: release.into(),
            reason: reason.into(),
        }
    }

    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CountlinesError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that only cost a single release during a run.
    pub fn is_per_release(&self) -> bool {
        matches!(
            self,
            CountlinesError::Checkout { .. } | CountlinesError::Count { .. }
        )
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::discover::Error> for CountlinesError {
    fn from(err: gix::discover::Error) -> Self {
        CountlinesError::GitDiscover(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for CountlinesError {
    fn from(err: gix::object::commit::Error) -> Self {
        CountlinesError::Commit(Box::new(err))
    }
}
