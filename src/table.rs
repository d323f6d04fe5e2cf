use crate::error::{CountlinesError, Result};
use crate::model::{CountRow, ResultsTable, CSV_HEADER};
use chrono::{NaiveDate, Utc};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a run writes its table.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// A directory; the file is named after the run date.
    Dir(PathBuf),
    /// An exact file path, which must not exist yet.
    File(PathBuf),
}

impl OutputTarget {
    /// Paths ending in `.csv` name a file, anything else a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            OutputTarget::File(path)
        } else {
            OutputTarget::Dir(path)
        }
    }
}

/// Write the table to a new file for this run and return its path.
pub fn persist(table: &ResultsTable, target: &OutputTarget) -> Result<PathBuf> {
    match target {
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = create_new(path)?.ok_or_else(|| {
                CountlinesError::Io(std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                ))
            })?;
            write_table(table, file)?;
            Ok(path.clone())
        }
        OutputTarget::Dir(dir) => write_dated(table, dir, Utc::now().date_naive()),
    }
}

/// Write the table as `<dir>/<date>.csv`, adding `-1`, `-2`, ... rather than overwriting.
pub fn write_dated(table: &ResultsTable, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stem = date.format("%Y-%m-%d").to_string();
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{stem}.csv")
        } else {
            format!("{stem}-{attempt}.csv")
        };
        let path = dir.join(name);
        if let Some(file) = create_new(&path)? {
            write_table(table, file)?;
            debug!(path = %path.display(), rows = table.len(), "wrote results table");
            return Ok(path);
        }
        attempt += 1;
    }
}

fn create_new(path: &Path) -> Result<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serialize rows as CSV. The header is written even for an empty table.
pub fn write_table<W: std::io::Write>(table: &ResultsTable, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for row in table.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read one results file written by [`write_table`].
pub fn load_table(path: &Path) -> Result<ResultsTable> {
    let file = File::open(path).map_err(|e| CountlinesError::load(path, e.to_string()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr
        .headers()
        .map_err(|e| CountlinesError::load(path, e.to_string()))?
        .clone();
    if headers.iter().ne(CSV_HEADER.iter().copied()) {
        return Err(CountlinesError::load(
            path,
            format!(
                "unexpected columns '{}', expected '{}'",
                headers.iter().collect::<Vec<_>>().join(","),
                CSV_HEADER.join(",")
            ),
        ));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.deserialize::<CountRow>().enumerate() {
        // header is line 1
        let row = record.map_err(|e| CountlinesError::load(path, format!("line {}: {e}", idx + 2)))?;
        rows.push(row);
    }

    let table = ResultsTable::from_rows(rows);
    if let Some((release, language)) = table.first_duplicate() {
        return Err(CountlinesError::load(
            path,
            format!("release {release} lists {language} more than once"),
        ));
    }
    debug!(path = %path.display(), rows = table.len(), "loaded results table");
    Ok(table)
}

/// Expand directories into the `*.csv` files they contain, sorted by name.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| CountlinesError::load(path, e.to_string()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .map(|ext| ext.eq_ignore_ascii_case("csv"))
                            .unwrap_or(false)
                })
                .collect();
            if files.is_empty() {
                return Err(CountlinesError::load(path, "directory has no .csv files"));
            }
            files.sort();
            out.extend(files);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

/// Load and concatenate results files in the given order.
pub fn load_tables(paths: &[PathBuf]) -> Result<ResultsTable> {
    let mut table = ResultsTable::new();
    for path in expand_paths(paths)? {
        table.concat(load_table(&path)?);
    }
    Ok(table)
}
