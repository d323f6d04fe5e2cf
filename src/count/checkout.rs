use crate::config::CheckoutConfig;
use crate::error::{CountlinesError, Result};
use crate::model::Release;
use crate::util::{describe_failure, render_template, run_tool};
use std::path::Path;

/// Materializes a release's source tree into a directory.
pub trait Checkout {
    fn checkout(&self, release: &Release, dest: &Path) -> Result<()>;
}

/// Checkout performed by an external program built from an argv template.
pub struct CommandCheckout {
    command: Vec<String>,
    repo: Option<String>,
}

impl CommandCheckout {
    pub fn new(command: Vec<String>, repo: Option<String>) -> Self {
        Self { command, repo }
    }

    pub fn from_config(config: &CheckoutConfig) -> Self {
        Self::new(config.command.clone(), config.repo.clone())
    }

    pub fn argv(&self, release: &Release, dest: &Path) -> Vec<String> {
        let dest = dest.to_string_lossy();
        let repo = self.repo.as_deref().unwrap_or("");
        render_template(
            &self.command,
            &[("release", release.id.as_str()), ("dest", &*dest), ("repo", repo)],
        )
    }
}

impl Checkout for CommandCheckout {
    fn checkout(&self, release: &Release, dest: &Path) -> Result<()> {
        let argv = self.argv(release, dest);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CountlinesError::Config("checkout.command is empty".into()))?;

        let output = run_tool(program, args, None)
            .map_err(|e| CountlinesError::checkout(&release.id, format!("cannot run {program}: {e}")))?;

        if !output.status.success() {
            return Err(CountlinesError::checkout(
                &release.id,
                format!("{program} failed with {}", describe_failure(&output)),
            ));
        }
        Ok(())
    }
}
