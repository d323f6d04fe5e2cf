use crate::cli::CommonArgs;
use crate::config::Config;
use crate::git::{fill_release_dates, GitRepo};
use crate::model::Release;
use crate::release;
use anyhow::Context;
use console::style;
use std::path::Path;

/// Print the release list a `count` run would process.
pub fn exec(
    common: &CommonArgs,
    args: &[String],
    releases_file: Option<&Path>,
    dates_from: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config =
        Config::discover(common.config.as_deref()).context("Failed to load configuration")?;
    let ids = release::collect(args, releases_file, &config.releases)
        .context("Failed to read release list")?;
    let mut releases = release::resolve(ids);

    if let Some(repo_path) = dates_from.or(config.dates_from.as_deref()) {
        let repo = GitRepo::open(repo_path).context("Failed to open git repository for release dates")?;
        fill_release_dates(&mut releases, &repo);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&releases)?);
    } else {
        output_list(&releases);
    }
    Ok(())
}

fn output_list(releases: &[Release]) {
    if releases.is_empty() {
        println!("No releases configured");
        return;
    }
    for release in releases {
        let date = release
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<20} {}", release.id, style(date).dim());
    }
    println!("\n{} releases", style(releases.len()).cyan());
}
