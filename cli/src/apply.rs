#![deny(missing_docs)]

//! # File Application
//!
//! Runs the transformation on a single file and writes the result back in
//! place, or only reports what would change in check mode.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use inject_core::{transform, Report};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{CliError, CliResult};

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Output equals input; nothing written.
    Unchanged,
    /// The file was rewritten.
    Rewritten,
    /// Check mode: the file would be rewritten.
    WouldChange,
    /// The file could not be processed.
    Failed,
}

/// Per-file entry of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    /// The processed path.
    pub path: PathBuf,
    /// Outcome.
    pub status: Status,
    /// Applied and skipped directives, when the transformation ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    /// Failure message, when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileSummary {
    /// Builds the summary of a failed file.
    pub fn failed(path: &Path, err: &CliError) -> Self {
        Self {
            path: path.to_path_buf(),
            status: Status::Failed,
            report: None,
            error: Some(err.to_string()),
        }
    }
}

/// Transforms `path`. In `check` mode the file is never written.
pub fn process_file(path: &Path, check: bool) -> CliResult<FileSummary> {
    let bytes = fs::read(path)?;
    let result = transform(&bytes)?;

    let status = match (result.changed(), check) {
        (false, _) => Status::Unchanged,
        (true, true) => Status::WouldChange,
        (true, false) => {
            write_atomically(path, result.output.as_bytes())?;
            Status::Rewritten
        }
    };
    tracing::debug!(path = %path.display(), ?status, "file processed");

    Ok(FileSummary {
        path: path.to_path_buf(),
        status,
        report: Some(result.report),
        error: None,
    })
}

/// Replaces `path` with `contents` through a temp file in the same directory,
/// keeping the original permissions.
pub fn write_atomically(path: &Path, contents: &[u8]) -> CliResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path).map_err(|e| CliError::Io(e.error))?;
    Ok(())
}
