//! Archiver - compresses a staging directory into `<dist>/<id>-<version>.zip`
//!
//! The archive holds a single top-level directory named after the staging
//! directory. Entries are written in sorted walk order.

use crate::core::error::{ReleaseError, ReleaseResult};
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes zip archives from staged directories
pub struct Archiver {
    options: SimpleFileOptions,
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Archiver {
    pub fn new() -> Self {
        Self {
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Zip `staging_dir` into `archive_path`, replacing any previous archive.
    ///
    /// Every entry name is prefixed with the staging directory's own name.
    pub fn create(&self, staging_dir: &Path, archive_path: &Path) -> ReleaseResult<PathBuf> {
        let base = staging_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| self.failure(archive_path, "staging directory has no name"))?;

        let file = File::create(archive_path).map_err(|e| {
            ReleaseError::io(format!("Failed to create {}", archive_path.display()), e)
        })?;
        let mut zip = ZipWriter::new(file);

        zip.add_directory(format!("{}/", base), self.options)
            .map_err(|e| self.failure(archive_path, e))?;

        let mut files = 0;
        for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| self.failure(archive_path, e))?;
            let relative = entry
                .path()
                .strip_prefix(staging_dir)
                .map_err(|e| self.failure(archive_path, e))?;
            let name = format!("{}/{}", base, entry_name(relative));

            if entry.file_type().is_dir() {
                zip.add_directory(format!("{}/", name), self.options)
                    .map_err(|e| self.failure(archive_path, e))?;
            } else {
                zip.start_file(name, self.options)
                    .map_err(|e| self.failure(archive_path, e))?;
                let mut source = File::open(entry.path()).map_err(|e| {
                    ReleaseError::io(format!("Failed to read {}", entry.path().display()), e)
                })?;
                io::copy(&mut source, &mut zip).map_err(|e| {
                    ReleaseError::io(format!("Failed to compress {}", entry.path().display()), e)
                })?;
                files += 1;
            }
        }

        zip.finish().map_err(|e| self.failure(archive_path, e))?;

        info!(archive = %archive_path.display(), files, "Created archive");
        Ok(archive_path.to_path_buf())
    }

    fn failure(&self, path: &Path, message: impl std::fmt::Display) -> ReleaseError {
        ReleaseError::ArchiveFailed {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Zip entry names always use `/`
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
