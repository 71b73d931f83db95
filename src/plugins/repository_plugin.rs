//! Repository plugin - pushes the release into a downstream addon repository
//!
//! Workflow:
//! 1. clone the repository unless a checkout already exists
//! 2. configure the commit identity
//! 3. copy the archive and manifest into `<checkout>/<addon>/`
//! 4. run the repository-preparation command
//! 5. `git add --all`, commit, force-push
//!
//! The force-push overwrites remote history on purpose; the downstream
//! repository is generated content.

use crate::core::config::{RepositoryConfig, render_template};
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::manifest::Manifest;
use crate::core::traits::{PublishOutcome, PublishTarget, ReleaseArtifact};
use crate::packaging::staging::{copy_file, create_dir};
use crate::security::command_executor::SafeCommandExecutor;
use crate::security::token_manager::{COMMIT_EMAIL, GITHUB_USERNAME, SecureTokenManager};
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the repository is cloned from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    /// Explicit URL (or local path) from the configuration
    Url(String),
    /// `https://<user>:<token>@<host>/<owner>/<name>.git`
    Authenticated { host: String, owner: Option<String> },
}

/// Fully resolved repository settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub name: String,
    pub remote: RemoteSource,
    pub branch: Option<String>,
    /// Absolute directory holding the checkout
    pub checkout_root: PathBuf,
    /// Subdirectory name for the addon; defaults to the manifest id
    pub addon_dir: Option<String>,
    pub prepare_command: Vec<String>,
    pub commit_message: String,
    pub changelog: bool,
}

impl RepositorySettings {
    /// Resolve configuration against the project directory.
    ///
    /// # Errors
    ///
    /// `RepositoryNameMissing` when no repository name is configured.
    pub fn from_config(
        config: &RepositoryConfig,
        project_dir: &Path,
        addon_dir: Option<String>,
    ) -> ReleaseResult<Self> {
        let name = config
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .ok_or(ReleaseError::RepositoryNameMissing)?;

        let remote = match &config.url {
            Some(url) => RemoteSource::Url(url.clone()),
            None => RemoteSource::Authenticated {
                host: config.host.clone(),
                owner: config.owner.clone(),
            },
        };

        Ok(Self {
            name,
            remote,
            branch: config.branch.clone(),
            checkout_root: project_dir.join(&config.checkout_root),
            addon_dir,
            prepare_command: config.prepare_command.clone(),
            commit_message: config.commit_message.clone(),
            changelog: config.changelog,
        })
    }

    /// Directory of the local checkout
    pub fn checkout_dir(&self) -> PathBuf {
        self.checkout_root.join(&self.name)
    }

    fn commit_message_for(&self, manifest: &Manifest) -> String {
        render_template(&self.commit_message, &manifest.id, &manifest.name, &manifest.version)
    }
}

/// Publishes into a git repository
pub struct RepositoryPlugin<'a> {
    settings: RepositorySettings,
    tokens: &'a SecureTokenManager,
}

impl<'a> RepositoryPlugin<'a> {
    pub fn new(settings: RepositorySettings, tokens: &'a SecureTokenManager) -> Self {
        Self { settings, tokens }
    }

    fn executor(&self, dir: &Path) -> ReleaseResult<SafeCommandExecutor<'a>> {
        Ok(SafeCommandExecutor::new(dir)?.with_redactor(self.tokens))
    }

    fn remote_url(&self) -> ReleaseResult<SecretString> {
        match &self.settings.remote {
            RemoteSource::Url(url) => Ok(SecretString::new(url.clone().into())),
            RemoteSource::Authenticated { host, owner } => {
                self.tokens
                    .authenticated_url(host, owner.as_deref(), &self.settings.name)
            }
        }
    }

    /// Clone the repository unless the checkout already exists
    fn ensure_checkout(&self) -> ReleaseResult<PathBuf> {
        let checkout = self.settings.checkout_dir();
        if checkout.exists() {
            info!(checkout = %checkout.display(), "Using existing checkout");
            return Ok(checkout);
        }

        create_dir(&self.settings.checkout_root)?;
        let url = self.remote_url()?;

        let mut args = vec!["clone"];
        if let Some(branch) = &self.settings.branch {
            args.push("--branch");
            args.push(branch);
        }
        args.push(url.expose_secret());
        args.push(&self.settings.name);

        self.executor(&self.settings.checkout_root)?.run("git", &args)?;

        info!(checkout = %checkout.display(), "Cloned repository");
        Ok(checkout)
    }

    /// Set `user.name` / `user.email` when credentials provide them
    fn configure_identity(&self, git: &SafeCommandExecutor<'_>) -> ReleaseResult<()> {
        let Some(username) = self.tokens.get_token(GITHUB_USERNAME) else {
            return Ok(());
        };
        let username = username.expose_secret();

        let email = match self.tokens.get_token(COMMIT_EMAIL) {
            Some(email) => email.expose_secret().to_string(),
            None => {
                let host = match &self.settings.remote {
                    RemoteSource::Authenticated { host, .. } => host.as_str(),
                    RemoteSource::Url(_) => "github.com",
                };
                format!("{}@users.noreply.{}", username, host)
            }
        };

        git.run("git", &["config", "user.name", username])?;
        git.run("git", &["config", "user.email", &email])?;
        Ok(())
    }

    /// Copy the release files into the addon subdirectory
    fn copy_release_files(
        &self,
        artifact: &ReleaseArtifact,
        addon_dir: &Path,
    ) -> ReleaseResult<usize> {
        create_dir(addon_dir)?;
        let mut files = 0;

        let archive_name = artifact.manifest.archive_name();
        copy_file(&artifact.archive_path, &addon_dir.join(&archive_name))?;
        files += 1;

        let manifest_name = artifact
            .manifest_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("addon.xml"));
        copy_file(&artifact.manifest_path, &addon_dir.join(manifest_name))?;
        files += 1;

        if self.settings.changelog
            && let Some(news) = &artifact.manifest.news
        {
            let changelog = addon_dir.join(format!("changelog-{}.txt", artifact.manifest.version));
            fs::write(&changelog, news).map_err(|e| {
                ReleaseError::io(format!("Failed to write {}", changelog.display()), e)
            })?;
            files += 1;
        }

        Ok(files)
    }

    fn run_prepare_command(&self, checkout: &Path) -> ReleaseResult<()> {
        let Some((program, args)) = self.settings.prepare_command.split_first() else {
            return Ok(());
        };

        let mut executor = self.executor(checkout)?;
        executor.allow(program);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        info!(command = %executor.display_command(program, &args), "Preparing repository");
        executor.run(program, &args)?;
        Ok(())
    }

    fn commit_and_push(&self, git: &SafeCommandExecutor<'_>, message: &str) -> ReleaseResult<String> {
        git.run("git", &["add", "--all"])?;
        git.run("git", &["commit", "--allow-empty", "-m", message])?;

        let refspec = match &self.settings.branch {
            Some(branch) => format!("HEAD:{}", branch),
            None => "HEAD".to_string(),
        };
        git.run("git", &["push", "--force", "origin", &refspec])?;

        Ok(git.run("git", &["rev-parse", "HEAD"])?)
    }
}

impl PublishTarget for RepositoryPlugin<'_> {
    fn name(&self) -> &str {
        "repository"
    }

    fn publish(&self, artifact: &ReleaseArtifact) -> ReleaseResult<PublishOutcome> {
        if !artifact.has_archive() {
            return Err(ReleaseError::ArchiveMissing {
                path: artifact.archive_path.clone(),
            });
        }

        let manifest = &artifact.manifest;
        let addon = self
            .settings
            .addon_dir
            .clone()
            .unwrap_or_else(|| manifest.id.clone());
        if addon != manifest.id {
            warn!(addon = %addon, id = %manifest.id, "Addon directory differs from manifest id");
        }

        let checkout = self.ensure_checkout()?;
        let git = self.executor(&checkout)?;
        self.configure_identity(&git)?;

        let addon_dir = checkout.join(&addon);
        let files = self.copy_release_files(artifact, &addon_dir)?;

        self.run_prepare_command(&checkout)?;

        let message = self.settings.commit_message_for(manifest);
        let commit = self.commit_and_push(&git, &message)?;

        info!(repository = %self.settings.name, commit = %commit, "Pushed release");

        Ok(PublishOutcome {
            target: self.name().to_string(),
            destination: addon_dir,
            files,
            detail: Some(commit),
        })
    }
}
