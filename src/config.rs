use crate::error::{CountlinesError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "countlines.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Release identifiers or `A..B` weekly ranges.
    pub releases: Vec<String>,
    /// Repository used to date releases whose identifier carries no date.
    pub dates_from: Option<PathBuf>,
    pub checkout: CheckoutConfig,
    pub counter: CounterConfig,
    pub manifest: Option<ManifestConfig>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckoutConfig {
    /// Program and arguments; `{release}`, `{dest}` and `{repo}` are substituted.
    pub command: Vec<String>,
    pub repo: Option<String>,
    /// Parent directory for the per-release temporary trees.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            command: [
                "git", "clone", "--quiet", "--depth", "1", "--branch", "{release}", "{repo}",
                "{dest}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            repo: None,
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub program: String,
    /// Passed as `--include-lang`; empty means every language.
    pub languages: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub extra_args: Vec<String>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            program: "cloc".to_string(),
            languages: Vec::new(),
            exclude_dirs: Vec::new(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest path relative to the checked-out tree.
    pub file: String,
    /// Products containing any of these paths are not counted.
    pub skip_markers: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file: "manifest.txt".to_string(),
            skip_markers: vec!["ups/eupspkg.cfg.sh".to_string(), "upstream".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Keep each raw counter report here when set.
    pub reports_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            reports_dir: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CountlinesError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load an explicit config, else `countlines.toml` in the working directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            Self::load(default_path)
        } else {
            debug!("no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.checkout.command.is_empty() {
            return Err(CountlinesError::Config("checkout.command is empty".into()));
        }
        let needs_repo = self.checkout.command.iter().any(|t| t.contains("{repo}"));
        if needs_repo && self.checkout.repo.is_none() {
            return Err(CountlinesError::Config(
                "checkout.command uses {repo} but no repository is configured (set checkout.repo or pass --repo)"
                    .into(),
            ));
        }
        if self.counter.program.trim().is_empty() {
            return Err(CountlinesError::Config("counter.program is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.counter.program, "cloc");
        assert_eq!(config.output.dir, PathBuf::from("data"));
        assert!(config.manifest.is_none());
        assert!(config.checkout.command.iter().any(|t| t == "{release}"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
releases = ["w.2017.1..w.2017.4", "10.1"]

[checkout]
command = ["lsst-build", "prepare", "--ref", "{release}", "{dest}", "lsst_distrib"]

[counter]
languages = ["Python", "C++", "C/C++ Header"]

[manifest]
"#,
        )
        .unwrap();
        assert_eq!(config.releases.len(), 2);
        assert_eq!(config.checkout.command[0], "lsst-build");
        assert_eq!(config.counter.languages.len(), 3);
        let manifest = config.manifest.unwrap();
        assert_eq!(manifest.file, "manifest.txt");
        assert_eq!(manifest.skip_markers.len(), 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[counter]\nprogramme = \"cloc\"\n").is_err());
    }

    #[test]
    fn repo_placeholder_requires_repo() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        config.checkout.repo = Some("https://example.com/distrib.git".into());
        assert!(config.validate().is_ok());
    }
}
