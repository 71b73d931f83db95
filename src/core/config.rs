//! Configuration structures and types for addon-release
//!
//! This module provides type-safe configuration management with serde support.
//! Every field is optional in the YAML file; [`ReleaseConfig::default`] holds
//! the values the tool uses when nothing is configured.

use serde::{Deserialize, Serialize};

/// Current configuration schema version
pub const SCHEMA_VERSION: &str = "1.0";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Schema version
    pub version: String,

    /// Input and output locations, relative to the project directory
    pub paths: PathsConfig,

    /// Downstream repository settings
    pub repository: RepositoryConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            paths: PathsConfig::default(),
            repository: RepositoryConfig::default(),
        }
    }
}

/// File and directory locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PathsConfig {
    /// Addon manifest
    pub manifest: String,

    /// Staging root; receives `<id>/` and `<id>-<version>.zip`
    pub dist_dir: String,

    /// Destination of the archive-free mirror
    pub docs_dir: String,

    /// Export-exclusion rules (`path attr...` per line)
    pub export_rules: String,

    /// Ignore rules (one bare path per line)
    pub ignore_rules: String,

    /// File receiving the released version; empty disables it
    pub version_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: "addon.xml".to_string(),
            dist_dir: "dist".to_string(),
            docs_dir: "docs".to_string(),
            export_rules: ".gitattributes".to_string(),
            ignore_rules: ".gitignore".to_string(),
            version_file: "version".to_string(),
        }
    }
}

/// Downstream repository configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Repository name (e.g. "repository.example")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Repository owner (default: the authenticated username)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Git host used to build the authenticated URL
    pub host: String,

    /// Explicit remote URL; bypasses credential URL construction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Branch to clone and push
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Directory the repository is cloned into
    pub checkout_root: String,

    /// Repository-preparation command, run inside the checkout; empty skips it
    pub prepare_command: Vec<String>,

    /// Commit message template (`{id}`, `{name}` and `{version}` are substituted)
    pub commit_message: String,

    /// Write `changelog-<version>.txt` from the manifest release notes
    pub changelog: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: None,
            owner: None,
            host: "github.com".to_string(),
            url: None,
            branch: None,
            checkout_root: ".release".to_string(),
            prepare_command: vec!["python3".to_string(), "create_repository.py".to_string()],
            commit_message: "Update {id} to {version}".to_string(),
            changelog: true,
        }
    }
}

/// Substitute `{id}`, `{name}` and `{version}` in a template
pub fn render_template(template: &str, id: &str, name: &str, version: &str) -> String {
    template
        .replace("{id}", id)
        .replace("{name}", name)
        .replace("{version}", version)
}
