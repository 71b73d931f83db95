//! Plugin Loader - builds the publish targets requested for a run
//!
//! Targets are returned in execution order: the docs mirror first, then the
//! repository push.

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::traits::PublishTarget;
use crate::plugins::mirror_plugin::MirrorPlugin;
use crate::plugins::repository_plugin::{RepositoryPlugin, RepositorySettings};
use crate::security::token_manager::SecureTokenManager;
use std::path::Path;

/// Which optional publish steps to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSelection {
    pub publish_docs: bool,
    pub push: bool,
    /// Addon subdirectory in the downstream repository
    pub addon_dir: Option<String>,
}

/// Plugin loader for publish targets
pub struct PluginLoader<'a> {
    config: &'a ReleaseConfig,
    tokens: &'a SecureTokenManager,
}

impl<'a> PluginLoader<'a> {
    pub fn new(config: &'a ReleaseConfig, tokens: &'a SecureTokenManager) -> Self {
        Self { config, tokens }
    }

    /// Instantiate the selected targets.
    ///
    /// Repository settings are resolved here, so a missing repository name
    /// fails before anything is packaged.
    pub fn load(
        &self,
        project_dir: &Path,
        selection: &PublishSelection,
    ) -> ReleaseResult<Vec<Box<dyn PublishTarget + 'a>>> {
        let mut targets: Vec<Box<dyn PublishTarget + 'a>> = Vec::new();

        if selection.publish_docs {
            let docs_dir = project_dir.join(&self.config.paths.docs_dir);
            targets.push(Box::new(MirrorPlugin::new(docs_dir)));
        }

        if selection.push {
            let settings = RepositorySettings::from_config(
                &self.config.repository,
                project_dir,
                selection.addon_dir.clone(),
            )?;
            targets.push(Box::new(RepositoryPlugin::new(settings, self.tokens)));
        }

        Ok(targets)
    }
}
