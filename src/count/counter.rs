use crate::config::CounterConfig;
use crate::error::{CountlinesError, Result};
use crate::model::{CountRow, Release};
use crate::util::{describe_failure, run_tool};
use serde_json::Value;
use std::path::Path;

/// Keys of a cloc JSON report that are not languages.
const META_KEYS: [&str; 2] = ["header", "SUM"];

/// Runs a line counter over some targets and returns its raw report.
pub trait LineCounter {
    fn report(&self, release: &Release, tree: &Path, targets: &[String]) -> Result<String>;
}

pub struct ClocCounter {
    config: CounterConfig,
}

impl ClocCounter {
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, targets: &[String]) -> Vec<String> {
        let mut args = vec!["--json".to_string(), "--quiet".to_string()];
        if !self.config.languages.is_empty() {
            args.push(format!("--include-lang={}", self.config.languages.join(",")));
        }
        if !self.config.exclude_dirs.is_empty() {
            args.push(format!("--exclude-dir={}", self.config.exclude_dirs.join(",")));
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.extend(targets.iter().cloned());
        args
    }
}

impl LineCounter for ClocCounter {
    fn report(&self, release: &Release, tree: &Path, targets: &[String]) -> Result<String> {
        let program = self.config.program.as_str();
        let output = run_tool(program, &self.args(targets), Some(tree))
            .map_err(|e| CountlinesError::count(&release.id, format!("cannot run {program}: {e}")))?;

        if !output.status.success() {
            return Err(CountlinesError::count(
                &release.id,
                format!("{program} failed with {}", describe_failure(&output)),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| CountlinesError::count(&release.id, "report is not valid UTF-8"))
    }
}

/// Parse a cloc `--json` report into one row per language, ordered by language name.
///
/// Fields beyond `nFiles`, `blank`, `comment` and `code` are ignored; a missing or
/// non-integer count is an error. Blank output means no languages were found.
pub fn parse_report(release: &Release, report: &str) -> Result<Vec<CountRow>> {
    if report.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(report)
        .map_err(|e| CountlinesError::count(&release.id, format!("unreadable report: {e}")))?;
    let languages = value
        .as_object()
        .ok_or_else(|| CountlinesError::count(&release.id, "report is not a JSON object"))?;

    let mut rows = Vec::with_capacity(languages.len());
    for (language, stats) in languages {
        if META_KEYS.contains(&language.as_str()) {
            continue;
        }
        let field = |name: &str| -> Result<u64> {
            stats.get(name).and_then(Value::as_u64).ok_or_else(|| {
                CountlinesError::count(
                    &release.id,
                    format!("language '{language}' has no valid '{name}' count"),
                )
            })
        };
        rows.push(CountRow {
            release: release.id.clone(),
            date: release.date,
            language: language.clone(),
            files: field("nFiles")?,
            blank: field("blank")?,
            comment: field("comment")?,
            code: field("code")?,
        });
    }
    rows.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(rows)
}
