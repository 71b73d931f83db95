//! Error handling for addon releases
//!
//! This module provides the error type shared by every release stage, with
//! recovery guidance, using the thiserror crate.

use crate::security::command_executor::CommandError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Manifest errors
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    #[error("Manifest root element has no '{attribute}' attribute")]
    ManifestAttributeMissing { attribute: String },

    #[error("Manifest is invalid: {}", errors.join("; "))]
    ManifestInvalid { errors: Vec<String> },

    // Selection errors
    #[error("Rule file not found: {}", path.display())]
    RuleFileMissing { path: PathBuf },

    // Filesystem and archive errors
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write archive {}: {message}", path.display())]
    ArchiveFailed { path: PathBuf, message: String },

    #[error("Archive does not exist: {}", path.display())]
    ArchiveMissing { path: PathBuf },

    // Publishing errors
    #[error("Repository name is not set")]
    RepositoryNameMissing,

    #[error("Environment variable {variable} is not set")]
    CredentialMissing { variable: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ReleaseError {
    /// Wrap an I/O error with a short description of what was being done
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ManifestNotFound { .. } => vec![
                "Run the command from the addon root directory",
                "Check the paths.manifest setting",
            ],
            Self::ManifestParse { .. } | Self::ManifestAttributeMissing { .. } => {
                vec!["Check that addon.xml is well-formed and carries id, name and version"]
            }
            Self::ManifestInvalid { .. } => vec!["Fix the reported manifest fields"],
            Self::RuleFileMissing { .. } => vec![
                "Add the missing rule file (an empty file is fine)",
                "Point paths.exportRules / paths.ignoreRules at existing files",
            ],
            Self::Io { .. } => vec!["Check file permissions and free disk space"],
            Self::ArchiveFailed { .. } => vec!["Check the dist directory is writable"],
            Self::ArchiveMissing { .. } => vec!["Run again with --zip to build the archive"],
            Self::RepositoryNameMissing => vec!["Pass --repo or set ADDON_REPO"],
            Self::CredentialMissing { .. } => {
                vec!["Set GH_USERNAME and GH_TOKEN (and optionally EMAIL)"]
            }
            Self::Command(_) => vec![
                "Check the command output",
                "Check that git and python are installed",
            ],
            Self::ConfigError(_) => vec!["Check .release-config.yaml"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
            Self::ManifestParse { .. } => "MANIFEST_PARSE",
            Self::ManifestAttributeMissing { .. } => "MANIFEST_ATTRIBUTE_MISSING",
            Self::ManifestInvalid { .. } => "MANIFEST_INVALID",
            Self::RuleFileMissing { .. } => "RULE_FILE_MISSING",
            Self::Io { .. } => "IO_ERROR",
            Self::ArchiveFailed { .. } => "ARCHIVE_FAILED",
            Self::ArchiveMissing { .. } => "ARCHIVE_MISSING",
            Self::RepositoryNameMissing => "REPOSITORY_NAME_MISSING",
            Self::CredentialMissing { .. } => "CREDENTIAL_MISSING",
            Self::Command(_) => "COMMAND_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}

/// Result alias used across the crate
pub type ReleaseResult<T> = Result<T, ReleaseError>;
