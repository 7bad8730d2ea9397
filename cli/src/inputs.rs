#![deny(missing_docs)]

//! # Input Collection
//!
//! Expands the command line paths into the list of files to process.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CliError, CliResult};

/// Resolves `paths` into a sorted, de-duplicated file list.
///
/// Files named explicitly are always included. Directories are walked
/// recursively and contribute the files whose name ends with `suffix`.
pub fn collect_inputs(paths: &[PathBuf], suffix: &str) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    CliError::General(format!("Failed to walk {:?}: {}", path, e))
                })?;
                if entry.file_type().is_file() && has_suffix(entry.path(), suffix) {
                    files.push(entry.into_path());
                }
            }
        } else {
            return Err(CliError::General(format!("Path not found: {:?}", path)));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}
