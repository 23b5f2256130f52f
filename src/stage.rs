//! Staging: copy the source tree into the output directory.
//!
//! Generation runs in place. Control files (`nav.md`, `summary.md`) are
//! consumed and rendered pages land next to their sources, so the build
//! works on a copy and the source tree is never modified.
//!
//! Skipped while copying:
//!
//! - hidden entries (`.git/`, `.DS_Store`), at any depth
//! - `config.toml` at the source root
//! - the output directory itself, when it lives inside the source tree
//!
//! When source and output are the same directory nothing is copied and the
//! build consumes the sources directly.

use crate::config::CONFIG_FILENAME;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Copy `source` into `output`. Returns the number of files copied.
pub fn stage_sources(source: &Path, output: &Path) -> Result<usize, StagingError> {
    if !source.is_dir() {
        return Err(StagingError::SourceNotFound(source.to_path_buf()));
    }
    fs::create_dir_all(output)?;

    let source = source.canonicalize()?;
    let output = output.canonicalize()?;
    if source == output {
        log::debug!("staging skipped: building {} in place", source.display());
        return Ok(0);
    }

    let walker = WalkDir::new(&source)
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && e.path() != output);

    let mut copied = 0;
    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&source)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        if relative.as_os_str().is_empty() || relative == Path::new(CONFIG_FILENAME) {
            continue;
        }

        let dest = output.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }

    log::debug!(
        "staged {copied} file(s) from {} into {}",
        source.display(),
        output.display()
    );
    Ok(copied)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
