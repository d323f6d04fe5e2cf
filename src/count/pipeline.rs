use super::checkout::Checkout;
use super::counter::{parse_report, LineCounter};
use super::manifest::select_products;
use crate::config::ManifestConfig;
use crate::error::{CountlinesError, Result};
use crate::model::{CountRow, Release, ReleaseFailure, ResultsTable, RunOutcome};
use crate::table::{self, OutputTarget};
use crate::util::{file_stem, is_empty_tree};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Sequences checkout and counting over a list of releases.
pub struct Pipeline<'a> {
    checkout: &'a dyn Checkout,
    counter: &'a dyn LineCounter,
    manifest: Option<ManifestConfig>,
    scratch_dir: Option<PathBuf>,
    reports_dir: Option<PathBuf>,
    progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(checkout: &'a dyn Checkout, counter: &'a dyn LineCounter) -> Self {
        Self {
            checkout,
            counter,
            manifest: None,
            scratch_dir: None,
            reports_dir: None,
            progress: false,
        }
    }

    pub fn with_manifest(mut self, manifest: Option<ManifestConfig>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn with_reports_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.reports_dir = dir;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn workdir(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("countlines-");
        let dir = match &self.scratch_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Check out one release into a fresh directory and count its lines.
    ///
    /// The directory is removed when this returns, whatever the outcome.
    pub fn count_release(&self, release: &Release) -> Result<Vec<CountRow>> {
        let workdir = self.workdir()?;
        let tree = workdir.path();
        debug!(release = %release.id, tree = %tree.display(), "checking out");

        self.checkout.checkout(release, tree)?;
        let empty = is_empty_tree(tree).map_err(|e| {
            CountlinesError::checkout(&release.id, format!("cannot inspect checkout: {e}"))
        })?;
        if empty {
            return Err(CountlinesError::checkout(&release.id, "checkout produced an empty tree"));
        }

        let targets = match &self.manifest {
            Some(manifest) => select_products(release, tree, manifest)?,
            None => vec![".".to_string()],
        };

        let report = self.counter.report(release, tree, &targets)?;
        if let Some(dir) = &self.reports_dir {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.json", file_stem(&release.id)));
            std::fs::write(&path, &report)?;
            debug!(release = %release.id, path = %path.display(), "saved counter report");
        }

        let rows = parse_report(release, &report)?;
        debug!(release = %release.id, languages = rows.len(), "counted");
        Ok(rows)
    }

    /// Count every release in order, skipping failures, and persist the table.
    pub fn run(&self, releases: &[Release], target: &OutputTarget) -> Result<RunOutcome> {
        let pb = if self.progress {
            let pb = ProgressBar::new(releases.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut table = ResultsTable::new();
        let mut failures = Vec::new();
        let mut succeeded = 0;
        let mut seen = HashSet::new();
        let mut requested = 0;

        for release in releases {
            if !seen.insert(release.id.as_str()) {
                warn!(release = %release.id, "duplicate release in list, counting it once");
                pb.inc(1);
                continue;
            }
            requested += 1;
            pb.set_message(release.id.clone());
            match self.count_release(release) {
                Ok(rows) => {
                    succeeded += 1;
                    table.extend(rows);
                }
                Err(err) if err.is_per_release() => {
                    pb.suspend(|| warn!(release = %release.id, error = %err, "skipping release"));
                    failures.push(ReleaseFailure {
                        release: release.id.clone(),
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    pb.finish_and_clear();
                    // keep what earlier releases produced before giving up
                    match table::persist(&table, target) {
                        Ok(path) => warn!(
                            release = %release.id,
                            path = %path.display(),
                            rows = table.len(),
                            "run aborted, partial table written"
                        ),
                        Err(e) => warn!(error = %e, "run aborted, partial table not written"),
                    }
                    return Err(err);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let output_path = table::persist(&table, target)?;
        info!(
            path = %output_path.display(),
            rows = table.len(),
            succeeded,
            failed = failures.len(),
            "run complete"
        );

        Ok(RunOutcome {
            table,
            output_path,
            releases_requested: requested,
            releases_succeeded: succeeded,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    const PYTHON_REPORT: &str =
        r#"{"header": {"n_files": 10}, "Python": {"nFiles": 10, "blank": 5, "comment": 3, "code": 100}}"#;

    /// Writes one source file per product, failing for the listed releases.
    struct FakeCheckout {
        failing: Vec<&'static str>,
        products: Vec<&'static str>,
        seen: RefCell<Vec<PathBuf>>,
    }

    impl FakeCheckout {
        fn new() -> Self {
            Self { failing: Vec::new(), products: Vec::new(), seen: RefCell::new(Vec::new()) }
        }
    }

    impl Checkout for FakeCheckout {
        fn checkout(&self, release: &Release, dest: &Path) -> Result<()> {
            self.seen.borrow_mut().push(dest.to_path_buf());
            if self.failing.contains(&release.id.as_str()) {
                return Err(CountlinesError::checkout(&release.id, "no such tag"));
            }
            fs::write(dest.join("main.py"), "print('hi')\n")?;
            if !self.products.is_empty() {
                let manifest: String = self.products.iter().map(|p| format!("{p} g123 1.0\n")).collect();
                fs::write(dest.join("manifest.txt"), manifest)?;
                for product in &self.products {
                    fs::create_dir_all(dest.join(product))?;
                }
            }
            Ok(())
        }
    }

    struct FakeCounter {
        report: &'static str,
        targets: RefCell<Vec<Vec<String>>>,
    }

    impl FakeCounter {
        fn new(report: &'static str) -> Self {
            Self { report, targets: RefCell::new(Vec::new()) }
        }
    }

    impl LineCounter for FakeCounter {
        fn report(&self, _release: &Release, _tree: &Path, targets: &[String]) -> Result<String> {
            self.targets.borrow_mut().push(targets.to_vec());
            Ok(self.report.to_string())
        }
    }

    #[test]
    fn release_rows_carry_id_and_date() {
        let checkout = FakeCheckout::new();
        let counter = FakeCounter::new(PYTHON_REPORT);
        let pipeline = Pipeline::new(&checkout, &counter);

        let rows = pipeline.count_release(&Release::new("w_2024_01")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].release, "w_2024_01");
        assert_eq!(rows[0].date, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!((rows[0].language.as_str(), rows[0].files, rows[0].code), ("Python", 10, 100));
        assert_eq!(counter.targets.borrow()[0], vec!["."]);
    }

    #[test]
    fn failed_releases_are_skipped_and_scratch_is_cleaned() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let checkout = FakeCheckout { failing: vec!["w.2017.11"], ..FakeCheckout::new() };
        let counter = FakeCounter::new(PYTHON_REPORT);
        let pipeline =
            Pipeline::new(&checkout, &counter).with_scratch_dir(Some(scratch.path().to_path_buf()));

        let releases: Vec<Release> =
            ["w.2017.10", "w.2017.11", "w.2017.12"].into_iter().map(Release::new).collect();
        let target = OutputTarget::File(out.path().join("run.csv"));
        let outcome = pipeline.run(&releases, &target).unwrap();

        assert_eq!(outcome.releases_requested, 3);
        assert_eq!(outcome.releases_succeeded, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].release, "w.2017.11");
        assert_eq!(outcome.table.releases(), vec!["w.2017.10", "w.2017.12"]);
        assert!(outcome.is_success());

        // every checkout got its own directory and none survive the run
        let seen = checkout.seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0] != seen[1] && seen[1] != seen[2]);
        assert!(seen.iter().all(|dir| !dir.exists()));
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);

        let saved = crate::table::load_table(&outcome.output_path).unwrap();
        assert_eq!(saved, outcome.table);
    }

    #[test]
    fn aborted_run_keeps_earlier_rows() {
        struct BrokenScratch;
        impl Checkout for BrokenScratch {
            fn checkout(&self, release: &Release, dest: &Path) -> Result<()> {
                if release.id == "10.2" {
                    return Err(std::io::Error::other("disk full").into());
                }
                fs::write(dest.join("main.py"), "print('hi')\n")?;
                Ok(())
            }
        }

        let out = tempfile::tempdir().unwrap();
        let path = out.path().join("run.csv");
        let counter = FakeCounter::new(PYTHON_REPORT);
        let releases = vec![Release::new("10.1"), Release::new("10.2"), Release::new("10.3")];
        let err = Pipeline::new(&BrokenScratch, &counter)
            .run(&releases, &OutputTarget::File(path.clone()))
            .unwrap_err();
        assert!(matches!(err, CountlinesError::Io(_)));

        let saved = crate::table::load_table(&path).unwrap();
        assert_eq!(saved.releases(), vec!["10.1"]);
        assert_eq!(counter.targets.borrow().len(), 1);
    }

    #[test]
    fn all_failures_give_unsuccessful_empty_run() {
        let out = tempfile::tempdir().unwrap();
        let checkout = FakeCheckout { failing: vec!["10.0", "10.1"], ..FakeCheckout::new() };
        let counter = FakeCounter::new(PYTHON_REPORT);
        let pipeline = Pipeline::new(&checkout, &counter);

        let releases = vec![Release::new("10.0"), Release::new("10.1")];
        let outcome = pipeline.run(&releases, &OutputTarget::Dir(out.path().to_path_buf())).unwrap();
        assert!(outcome.table.is_empty());
        assert!(!outcome.is_success());
        assert!(outcome.output_path.exists());
    }

    #[test]
    fn repeated_release_is_counted_once() {
        let out = tempfile::tempdir().unwrap();
        let checkout = FakeCheckout::new();
        let counter = FakeCounter::new(PYTHON_REPORT);
        let releases = vec![Release::new("10.1"), Release::new("10.2"), Release::new("10.1")];
        let outcome = Pipeline::new(&checkout, &counter)
            .run(&releases, &OutputTarget::Dir(out.path().to_path_buf()))
            .unwrap();
        assert_eq!(outcome.releases_requested, 2);
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(checkout.seen.borrow().len(), 2);
    }

    #[test]
    fn empty_release_list_succeeds() {
        let out = tempfile::tempdir().unwrap();
        let checkout = FakeCheckout::new();
        let counter = FakeCounter::new(PYTHON_REPORT);
        let outcome = Pipeline::new(&checkout, &counter)
            .run(&[], &OutputTarget::Dir(out.path().to_path_buf()))
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.releases_requested, 0);
    }

    #[test]
    fn empty_checkout_is_a_failure() {
        struct NoopCheckout;
        impl Checkout for NoopCheckout {
            fn checkout(&self, _release: &Release, _dest: &Path) -> Result<()> {
                Ok(())
            }
        }
        let counter = FakeCounter::new(PYTHON_REPORT);
        let err = Pipeline::new(&NoopCheckout, &counter)
            .count_release(&Release::new("10.1"))
            .unwrap_err();
        assert!(matches!(err, CountlinesError::Checkout { .. }));
        assert!(counter.targets.borrow().is_empty());
    }

    #[test]
    fn malformed_report_skips_release() {
        let checkout = FakeCheckout::new();
        let counter = FakeCounter::new("Language,files,code\nPython,1,2\n");
        let err = Pipeline::new(&checkout, &counter)
            .count_release(&Release::new("10.1"))
            .unwrap_err();
        assert!(err.is_per_release());
    }

    #[test]
    fn reports_are_kept_when_asked() {
        let reports = tempfile::tempdir().unwrap();
        let checkout = FakeCheckout::new();
        let counter = FakeCounter::new(PYTHON_REPORT);
        Pipeline::new(&checkout, &counter)
            .with_reports_dir(Some(reports.path().join("raw")))
            .count_release(&Release::new("w.2017.10"))
            .unwrap();
        let saved = fs::read_to_string(reports.path().join("raw/w.2017.10.json")).unwrap();
        assert_eq!(saved, PYTHON_REPORT);
    }

    #[test]
    fn manifest_products_become_targets() {
        let checkout = FakeCheckout { products: vec!["afw", "daf_butler"], ..FakeCheckout::new() };
        let counter = FakeCounter::new(PYTHON_REPORT);
        Pipeline::new(&checkout, &counter)
            .with_manifest(Some(ManifestConfig::default()))
            .count_release(&Release::new("w.2020.1"))
            .unwrap();
        assert_eq!(counter.targets.borrow()[0], vec!["afw", "daf_butler"]);
    }
}
