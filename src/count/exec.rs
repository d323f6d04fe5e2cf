use super::{output_json, output_summary, ClocCounter, CommandCheckout, Pipeline};
use crate::cli::{CommonArgs, CountArgs};
use crate::config::{Config, ManifestConfig};
use crate::git::{fill_release_dates, GitRepo};
use crate::release;
use crate::table::OutputTarget;
use anyhow::Context;
use std::process::ExitCode;
use tracing::{error, info};

pub fn exec(common: &CommonArgs, args: CountArgs) -> anyhow::Result<ExitCode> {
    let mut config =
        Config::discover(common.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);

    let ids = release::collect(&args.releases, args.releases_file.as_deref(), &config.releases)
        .context("Failed to read release list")?;
    let mut releases = release::resolve(ids);

    if !releases.is_empty() {
        config.validate().context("Invalid configuration")?;
    }

    if let Some(repo_path) = &config.dates_from {
        let repo = GitRepo::open(repo_path).context("Failed to open git repository for release dates")?;
        let filled = fill_release_dates(&mut releases, &repo);
        info!(filled, repo = %repo.path().display(), "dated releases from git tags");
    }

    let checkout = CommandCheckout::from_config(&config.checkout);
    let counter = ClocCounter::new(config.counter.clone());
    let show_progress = !args.json && !args.no_progress && console::Term::stderr().is_term();

    let pipeline = Pipeline::new(&checkout, &counter)
        .with_manifest(config.manifest.clone())
        .with_scratch_dir(config.checkout.scratch_dir.clone())
        .with_reports_dir(config.output.reports_dir.clone())
        .with_progress(show_progress);

    let target = match &args.output {
        Some(path) => OutputTarget::from_path(path),
        None => OutputTarget::Dir(config.output.dir.clone()),
    };

    let outcome = pipeline
        .run(&releases, &target)
        .context("Failed to complete the run")?;

    if args.json {
        output_json(&outcome)?;
    } else {
        output_summary(&outcome)?;
    }

    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            requested = outcome.releases_requested,
            "no release produced any line counts"
        );
        Ok(ExitCode::FAILURE)
    }
}

fn apply_overrides(config: &mut Config, args: &CountArgs) {
    if let Some(repo) = &args.repo {
        config.checkout.repo = Some(repo.clone());
    }
    if let Some(dir) = &args.scratch_dir {
        config.checkout.scratch_dir = Some(dir.clone());
    }
    if let Some(program) = &args.counter {
        config.counter.program = program.clone();
    }
    if !args.languages.is_empty() {
        config.counter.languages = args.languages.clone();
    }
    if let Some(file) = &args.manifest {
        let manifest = config.manifest.get_or_insert_with(ManifestConfig::default);
        manifest.file = file.clone();
    }
    if let Some(dir) = &args.keep_reports {
        config.output.reports_dir = Some(dir.clone());
    }
    if let Some(repo) = &args.dates_from {
        config.dates_from = Some(repo.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = CountArgs {
            repo: Some("https://example.com/distrib.git".into()),
            counter: Some("/opt/cloc.pl".into()),
            languages: vec!["Python".into()],
            manifest: Some("manifest.txt".into()),
            keep_reports: Some(PathBuf::from("reports")),
            ..CountArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.checkout.repo.as_deref(), Some("https://example.com/distrib.git"));
        assert_eq!(config.counter.program, "/opt/cloc.pl");
        assert_eq!(config.counter.languages, vec!["Python"]);
        assert_eq!(config.manifest.unwrap().skip_markers.len(), 2);
        assert_eq!(config.output.reports_dir, Some(PathBuf::from("reports")));
    }
}
