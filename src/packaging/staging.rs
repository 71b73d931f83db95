//! Staging - copies the selected entries into `<dist>/<id>`
//!
//! Existing directories are merged and existing files overwritten one by one.
//! Nothing is removed from the staging directory, so files dropped from the
//! project since the previous run stay until `<dist>` is cleaned.

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::packaging::file_selector::FileSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Counters reported by [`copy_tree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub skipped: usize,
}

/// Copies a file set from the project into the staging directory
pub struct Stager<'a> {
    project_dir: &'a Path,
    dist_dir: PathBuf,
}

impl<'a> Stager<'a> {
    pub fn new(project_dir: &'a Path, dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir,
            dist_dir: dist_dir.into(),
        }
    }

    /// Staging directory for an addon id
    pub fn staging_dir(&self, id: &str) -> PathBuf {
        self.dist_dir.join(id)
    }

    /// Copy every entry of `files` into `<dist>/<id>` and return that directory
    pub fn stage(&self, files: &FileSet, id: &str) -> ReleaseResult<PathBuf> {
        let dest = self.staging_dir(id);
        create_dir(&dest)?;

        let mut copied = 0;
        for entry in files.entries() {
            let src = self.project_dir.join(entry);
            let target = dest.join(entry);

            if src.is_file() {
                copy_file(&src, &target)?;
                copied += 1;
            } else {
                copied += copy_tree(&src, &target, |_| true)?.files;
            }
        }

        info!(
            entries = files.len(),
            files = copied,
            dest = %dest.display(),
            "Staged addon files"
        );
        Ok(dest)
    }
}

/// Recursively copy `src` into `dst`, merging with existing content.
///
/// Files for which `keep` returns false are skipped; directories are always
/// walked. `keep` receives the path relative to `src`.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    mut keep: impl FnMut(&Path) -> bool,
) -> ReleaseResult<CopyStats> {
    let mut stats = CopyStats::default();
    create_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let message = format!("Failed to walk {}", src.display());
            match e.into_io_error() {
                Some(io_error) => ReleaseError::io(message, io_error),
                None => ReleaseError::io(message, std::io::Error::other("filesystem loop")),
            }
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ReleaseError::io("Failed to relativize path", std::io::Error::other(e)))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target)?;
        } else if keep(relative) {
            copy_file(entry.path(), &target)?;
            stats.files += 1;
        } else {
            debug!(path = %relative.display(), "Skipped");
            stats.skipped += 1;
        }
    }

    Ok(stats)
}

/// Create a directory and its parents; an existing directory is fine
pub(crate) fn create_dir(path: &Path) -> ReleaseResult<()> {
    fs::create_dir_all(path)
        .map_err(|e| ReleaseError::io(format!("Failed to create {}", path.display()), e))
}

pub(crate) fn copy_file(src: &Path, dst: &Path) -> ReleaseResult<()> {
    if let Some(parent) = dst.parent() {
        create_dir(parent)?;
    }
    fs::copy(src, dst).map_err(|e| {
        ReleaseError::io(
            format!("Failed to copy {} to {}", src.display(), dst.display()),
            e,
        )
    })?;
    Ok(())
}
