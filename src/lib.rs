pub mod cli;
pub mod config;
pub mod count;
pub mod error;
pub mod git;
pub mod listing;
pub mod logging;
pub mod model;
pub mod plot;
pub mod release;
pub mod table;
pub mod tui;
pub mod util;

pub use error::{CountlinesError, Result};
