//! Release Pipeline - main orchestrator for an addon release
//!
//! Runs the stages strictly in sequence; the first failure aborts the run:
//! - Publish target resolution (fails early on missing repository settings)
//! - Manifest loading and validation
//! - File selection and staging
//! - Archive creation
//! - Publish targets (docs mirror, repository push)
//! - Version file and metadata record

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::manifest::Manifest;
use crate::core::traits::{PublishOutcome, ReleaseArtifact};
use crate::orchestration::metadata::ReleaseMetadata;
use crate::packaging::archiver::Archiver;
use crate::packaging::file_selector::{FileSelector, FileSet};
use crate::packaging::staging::Stager;
use crate::plugins::plugin_loader::{PluginLoader, PublishSelection};
use crate::security::token_manager::SecureTokenManager;
use crate::validation::ManifestValidator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Release options passed from the CLI
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Addon root directory
    pub project_dir: PathBuf,

    /// Addon subdirectory name in the downstream repository
    pub addon_id: Option<String>,

    /// Build `<dist>/<id>-<version>.zip`
    pub zip: bool,

    /// Mirror the staging tree into the docs directory
    pub publish_docs: bool,

    /// Update and force-push the downstream repository
    pub push: bool,

    /// Produce the metadata record
    pub emit_metadata: bool,
}

/// Report returned after a release run
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub files: FileSet,
    pub artifact: ReleaseArtifact,
    pub archive_built: bool,
    pub published: Vec<PublishOutcome>,
    pub version_file: Option<PathBuf>,
    pub metadata: Option<ReleaseMetadata>,
}

/// Main release orchestrator
pub struct ReleasePipeline<'a> {
    config: ReleaseConfig,
    tokens: &'a SecureTokenManager,
}

impl<'a> ReleasePipeline<'a> {
    pub fn new(config: ReleaseConfig, tokens: &'a SecureTokenManager) -> Self {
        Self { config, tokens }
    }

    /// Run the release
    pub fn run(&self, options: &ReleaseOptions) -> ReleaseResult<ReleaseReport> {
        let project_dir = options.project_dir.as_path();
        let paths = &self.config.paths;

        let selection = PublishSelection {
            publish_docs: options.publish_docs,
            push: options.push,
            addon_dir: options.addon_id.clone(),
        };
        let targets = PluginLoader::new(&self.config, self.tokens).load(project_dir, &selection)?;

        // Manifest
        let manifest_path = project_dir.join(&paths.manifest);
        let manifest = self.load_manifest(&manifest_path)?;
        info!(id = %manifest.id, version = %manifest.version, "Releasing addon");

        // Selection and staging
        let files = FileSelector::new(
            project_dir,
            Path::new(&paths.export_rules),
            Path::new(&paths.ignore_rules),
        )
        .with_outputs([&paths.dist_dir, &paths.docs_dir, &paths.version_file])
        .select()?;
        info!(entries = ?files.entries(), "Selected files");

        let dist_dir = project_dir.join(&paths.dist_dir);
        let staging_dir = Stager::new(project_dir, &dist_dir).stage(&files, &manifest.id)?;

        // Archive
        let archive_path = dist_dir.join(manifest.archive_name());
        if options.zip {
            Archiver::new().create(&staging_dir, &archive_path)?;
        }

        let artifact = ReleaseArtifact {
            project_dir: project_dir.to_path_buf(),
            manifest_path,
            manifest,
            dist_dir,
            staging_dir,
            archive_path,
        };

        // Publishing
        let mut published = Vec::with_capacity(targets.len());
        for target in &targets {
            info!(target = target.name(), "Publishing");
            published.push(target.publish(&artifact)?);
        }

        let version_file = self.write_version_file(project_dir, &artifact.manifest)?;

        let metadata = options.emit_metadata.then(|| {
            let dest = Path::new(&paths.dist_dir).join(&artifact.manifest.id);
            ReleaseMetadata::new(&artifact.manifest, &dest)
        });

        Ok(ReleaseReport {
            files,
            artifact,
            archive_built: options.zip,
            published,
            version_file,
            metadata,
        })
    }

    fn load_manifest(&self, path: &Path) -> ReleaseResult<Manifest> {
        let manifest = Manifest::load(path)?;
        let result = ManifestValidator::new().validate(&manifest);

        for warning in &result.warnings {
            warn!("{}", warning);
        }
        if !result.is_valid {
            return Err(ReleaseError::ManifestInvalid {
                errors: result.errors,
            });
        }

        Ok(manifest)
    }

    /// Write the version (no trailing newline); an empty path disables it
    fn write_version_file(
        &self,
        project_dir: &Path,
        manifest: &Manifest,
    ) -> ReleaseResult<Option<PathBuf>> {
        let version_file = &self.config.paths.version_file;
        if version_file.trim().is_empty() {
            return Ok(None);
        }

        let path = project_dir.join(version_file);
        fs::write(&path, &manifest.version)
            .map_err(|e| ReleaseError::io(format!("Failed to write {}", path.display()), e))?;

        info!(path = %path.display(), "Wrote version file");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn addon(root: &Path, version: &str) {
        fs::write(
            root.join("addon.xml"),
            format!(r#"<addon id="plugin.test" name="Test [Beta]" version="{}"/>"#, version),
        )
        .unwrap();
        fs::write(root.join(".gitattributes"), "").unwrap();
        fs::write(root.join(".gitignore"), "").unwrap();
        fs::write(root.join("main.py"), "pass").unwrap();
    }

    fn options(root: &Path) -> ReleaseOptions {
        ReleaseOptions {
            project_dir: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_stage_only_run() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "1.0.0");
        let tokens = SecureTokenManager::default();

        let report = ReleasePipeline::new(ReleaseConfig::default(), &tokens)
            .run(&options(dir.path()))
            .unwrap();

        assert!(!report.archive_built);
        assert!(!report.artifact.has_archive());
        assert!(dir.path().join("dist/plugin.test/main.py").is_file());
        assert!(report.metadata.is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("version")).unwrap(),
            "1.0.0"
        );
    }

    #[test]
    fn test_metadata_uses_relative_dest() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "1.0.0");
        let tokens = SecureTokenManager::default();

        let mut opts = options(dir.path());
        opts.emit_metadata = true;
        let report = ReleasePipeline::new(ReleaseConfig::default(), &tokens)
            .run(&opts)
            .unwrap();

        let metadata = report.metadata.unwrap();
        assert_eq!(metadata.dest, "dist/plugin.test");
        assert_eq!(metadata.name, "Test ");
    }

    #[test]
    fn test_empty_version_file_disables_it() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "1.0.0");
        let tokens = SecureTokenManager::default();
        let mut config = ReleaseConfig::default();
        config.paths.version_file = String::new();

        let report = ReleasePipeline::new(config, &tokens)
            .run(&options(dir.path()))
            .unwrap();

        assert!(report.version_file.is_none());
        assert!(!dir.path().join("version").exists());
    }

    #[test]
    fn test_invalid_manifest_aborts_before_staging() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "");
        let tokens = SecureTokenManager::default();

        let err = ReleasePipeline::new(ReleaseConfig::default(), &tokens)
            .run(&options(dir.path()))
            .unwrap_err();

        assert_eq!(err.code(), "MANIFEST_INVALID");
        assert!(!dir.path().join("dist").exists());
    }

    #[test]
    fn test_push_without_archive_fails() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "1.0.0");
        let tokens = SecureTokenManager::default();
        let mut config = ReleaseConfig::default();
        config.repository.name = Some("repo".to_string());

        let mut opts = options(dir.path());
        opts.push = true;
        let err = ReleasePipeline::new(config, &tokens).run(&opts).unwrap_err();

        assert!(matches!(err, ReleaseError::ArchiveMissing { .. }));
    }
}
