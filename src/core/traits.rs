//! Core traits and types for publishing a packaged addon
//!
//! A publish target receives the artifact produced by the packaging stages and
//! copies or pushes it somewhere. Targets run one after another, in the order
//! the plugin loader returns them.

use crate::core::error::ReleaseResult;
use crate::core::manifest::Manifest;
use serde::Serialize;
use std::path::PathBuf;

// ============================================================================
// Artifact
// ============================================================================

/// What the packaging stages produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseArtifact {
    /// Project directory the manifest was read from
    pub project_dir: PathBuf,
    /// Manifest file inside the project
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    /// Staging root (`<dist>`)
    pub dist_dir: PathBuf,
    /// Staged addon tree (`<dist>/<id>`)
    pub staging_dir: PathBuf,
    /// Expected archive location; it exists only if it was built
    pub archive_path: PathBuf,
}

impl ReleaseArtifact {
    /// Whether the archive is present on disk
    pub fn has_archive(&self) -> bool {
        self.archive_path.is_file()
    }
}

// ============================================================================
// Publishing
// ============================================================================

/// Result of one publish target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub target: String,
    /// Where the artifact ended up
    pub destination: PathBuf,
    /// Files written by the target
    pub files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Destination for a packaged addon
pub trait PublishTarget {
    /// Target name for logs and reports
    fn name(&self) -> &str;

    /// Publish the artifact. Implementations run to completion or fail; there
    /// is no rollback.
    fn publish(&self, artifact: &ReleaseArtifact) -> ReleaseResult<PublishOutcome>;
}
