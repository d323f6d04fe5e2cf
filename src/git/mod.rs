mod repo;

pub use repo::{fill_release_dates, GitRepo};
