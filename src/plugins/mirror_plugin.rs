//! Docs mirror plugin - copies the staging tree without archives
//!
//! Produces a repository-style layout (for static hosting) next to the project:
//! every file under `<dist>` except `*.zip`.

use crate::core::error::ReleaseResult;
use crate::core::traits::{PublishOutcome, PublishTarget, ReleaseArtifact};
use crate::packaging::staging::copy_tree;
use std::path::{Path, PathBuf};
use tracing::info;

/// Mirrors `<dist>` into a second directory, skipping archives
pub struct MirrorPlugin {
    destination: PathBuf,
}

impl MirrorPlugin {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }
}

/// Whether a file belongs in the mirror
pub fn is_mirrored(path: &Path) -> bool {
    !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

impl PublishTarget for MirrorPlugin {
    fn name(&self) -> &str {
        "docs-mirror"
    }

    fn publish(&self, artifact: &ReleaseArtifact) -> ReleaseResult<PublishOutcome> {
        let stats = copy_tree(&artifact.dist_dir, &self.destination, is_mirrored)?;

        info!(
            dest = %self.destination.display(),
            files = stats.files,
            skipped = stats.skipped,
            "Mirrored staging tree"
        );

        Ok(PublishOutcome {
            target: self.name().to_string(),
            destination: self.destination.clone(),
            files: stats.files,
            detail: (stats.skipped > 0).then(|| format!("{} archive(s) skipped", stats.skipped)),
        })
    }
}
