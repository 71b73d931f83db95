//! addon-release CLI
//!
//! Packages a Kodi-style addon and optionally publishes it

use addon_release::core::config_loader::{ConfigLoadOptions, ConfigLoader, ConfigOverrides};
use addon_release::{
    ReleaseError, ReleaseOptions, ReleasePipeline, ReleaseReport, SecureTokenManager, logging,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::warn;

/// Package a Kodi-style addon for release
#[derive(Parser)]
#[command(name = "addon-release")]
#[command(version)]
#[command(about = "Package a Kodi-style addon for release", long_about = None)]
struct Cli {
    /// Addon subdirectory in the downstream repository (defaults to the manifest id)
    #[arg(value_name = "ADDON_ID", env = "ADDON_ID")]
    addon_id: Option<String>,

    /// Update and force-push the downstream repository
    #[arg(long)]
    push: bool,

    /// Mirror the staging tree (without archives) into the docs directory
    #[arg(long)]
    publish_docs: bool,

    /// Build the release archive
    #[arg(long)]
    zip: bool,

    /// Downstream repository name
    #[arg(long, value_name = "NAME", env = "ADDON_REPO")]
    repo: Option<String>,

    /// Branch to clone and push
    #[arg(long, value_name = "NAME")]
    branch: Option<String>,

    /// File receiving the released version (empty disables it)
    #[arg(long, value_name = "PATH")]
    version_file: Option<String>,

    /// Print the release metadata as one JSON line on stdout
    #[arg(long)]
    metadata: bool,

    /// Addon root directory
    #[arg(short = 'C', long, value_name = "PATH", default_value = ".")]
    project_dir: PathBuf,

    /// Configuration file (defaults to <PROJECT_DIR>/.release-config.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\n❌ Error");
        eprintln!("{:#}", e);
        if let Some(release_error) = e.downcast_ref::<ReleaseError>() {
            eprintln!("\n💡 Suggested actions:");
            for action in release_error.suggested_actions() {
                eprintln!("  - {}", action);
            }
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(ConfigLoadOptions {
        project_path: cli.project_dir.clone(),
        config_file: cli.config.clone(),
        overrides: ConfigOverrides {
            repository: cli.repo.clone(),
            branch: cli.branch.clone(),
            version_file: cli.version_file.clone(),
        },
        env: std::env::vars().collect(),
    })?;

    let validation = ConfigLoader::validate(&config);
    for warning in &validation.warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }
    if !validation.valid {
        bail!(
            "Invalid configuration\n{}",
            ConfigLoader::format_validation_result(&validation)
        );
    }

    let tokens = SecureTokenManager::from_env();
    let options = ReleaseOptions {
        project_dir: cli.project_dir,
        addon_id: cli.addon_id,
        zip: cli.zip,
        publish_docs: cli.publish_docs,
        push: cli.push,
        emit_metadata: cli.metadata,
    };

    let report = ReleasePipeline::new(config, &tokens)
        .run(&options)
        .context("Release failed")?;

    print_summary(&report);

    if let Some(metadata) = &report.metadata {
        metadata.emit(&mut io::stdout().lock())?;
    }

    Ok(())
}

/// Status lines go to stderr; stdout is reserved for the metadata record
fn print_summary(report: &ReleaseReport) {
    let manifest = &report.artifact.manifest;
    eprintln!(
        "\n📦 {} {} ({} entries staged in {})",
        manifest.id,
        manifest.version,
        report.files.len(),
        report.artifact.staging_dir.display()
    );

    if report.archive_built {
        eprintln!("🗜️  Archive: {}", report.artifact.archive_path.display());
    }

    for outcome in &report.published {
        match &outcome.detail {
            Some(detail) => eprintln!(
                "🚀 {}: {} files -> {} ({})",
                outcome.target,
                outcome.files,
                outcome.destination.display(),
                detail
            ),
            None => eprintln!(
                "🚀 {}: {} files -> {}",
                outcome.target,
                outcome.files,
                outcome.destination.display()
            ),
        }
    }

    if let Some(path) = &report.version_file {
        eprintln!("📝 Version file: {}", path.display());
    }

    eprintln!("\n✅ Release completed successfully!");
}
