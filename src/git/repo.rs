use crate::error::{CountlinesError, Result};
use crate::model::Release;
use chrono::{DateTime, NaiveDate};
use gix::{discover, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = discover(path.as_ref())?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commit date of the object a tag or other revision points at.
    pub fn release_date(&self, rev: &str) -> Result<NaiveDate> {
        // annotated tags peel to the commit they point at
        let spec = format!("{rev}^{{commit}}");
        let id = self
            .repo
            .rev_parse_single(spec.as_str())
            .map_err(|e| CountlinesError::Git(format!("Unknown revision '{rev}': {e}")))?;

        let commit = id
            .object()
            .map_err(|e| CountlinesError::Git(format!("Cannot read '{rev}': {e}")))?
            .try_into_commit()
            .map_err(|_| CountlinesError::Git(format!("Not a commit: {rev}")))?;

        let secs = commit.time()?.seconds;
        DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| CountlinesError::Git(format!("Invalid timestamp: {secs}")))
    }
}

/// Give undated releases the commit date of the matching revision, where one exists.
pub fn fill_release_dates(releases: &mut [Release], repo: &GitRepo) -> usize {
    let mut filled = 0;
    for release in releases.iter_mut().filter(|r| r.date.is_none()) {
        match repo.release_date(&release.id) {
            Ok(date) => {
                release.date = Some(date);
                filled += 1;
            }
            Err(e) => debug!(release = %release.id, error = %e, "no date for release"),
        }
    }
    filled
}
