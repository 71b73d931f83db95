//! Configuration file loader for addon-release
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::{ReleaseError, ReleaseResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".release-config.yaml";

lazy_static! {
    /// Environment variable pattern (${VAR_NAME})
    static ref ENV_VAR: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid");
}

/// Downstream repository name
pub const ENV_REPOSITORY: &str = "ADDON_REPO";

/// Staging root override
pub const ENV_DIST_DIR: &str = "ADDON_RELEASE_DIST_DIR";

/// Docs mirror override
pub const ENV_DOCS_DIR: &str = "ADDON_RELEASE_DOCS_DIR";

/// Values given on the command line (highest priority)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub version_file: Option<String>,
}

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Explicit config file; replaces `<project>/.release-config.yaml`
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub overrides: ConfigOverrides,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    /// Is configuration valid?
    pub valid: bool,

    /// Validation errors
    pub errors: Vec<ConfigValidationError>,

    /// Validation warnings
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "paths.distDir")
    pub field: String,

    /// Error message
    pub message: String,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    /// Field path
    pub field: String,

    /// Warning message
    pub message: String,

    /// Suggestion
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.release-config.yaml or `--config`)
    /// 4. Default values
    pub fn load(options: ConfigLoadOptions) -> ReleaseResult<ReleaseConfig> {
        let config_path = options
            .config_file
            .clone()
            .unwrap_or_else(|| options.project_path.join(CONFIG_FILENAME));

        // An explicitly requested file must exist; the implicit one is optional
        let mut config = match Self::load_config_file(&config_path)? {
            Some(config) => config,
            None if options.config_file.is_some() => {
                return Err(ReleaseError::ConfigError(format!(
                    "Config file not found: {}",
                    config_path.display()
                )));
            }
            None => ReleaseConfig::default(),
        };

        config = Self::expand_env_vars(config, &options.env);
        Self::apply_env(&mut config, &options.env);
        Self::apply_overrides(&mut config, options.overrides);

        Ok(config)
    }

    /// Load configuration from a YAML file, `None` when it does not exist
    fn load_config_file(file_path: &Path) -> ReleaseResult<Option<ReleaseConfig>> {
        if !file_path.exists() {
            debug!(path = %file_path.display(), "No config file, using defaults");
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).map_err(|e| {
            ReleaseError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        // An empty document deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Some(ReleaseConfig::default()));
        }

        let config: ReleaseConfig = serde_yaml::from_str(&content).map_err(|e| {
            ReleaseError::ConfigError(format!("Failed to parse YAML config: {}", e))
        })?;

        debug!(path = %file_path.display(), "Loaded config file");
        Ok(Some(config))
    }

    /// Apply environment variable overrides
    fn apply_env(config: &mut ReleaseConfig, env: &HashMap<String, String>) {
        if let Some(name) = env.get(ENV_REPOSITORY).filter(|v| !v.is_empty()) {
            config.repository.name = Some(name.clone());
        }
        if let Some(dist) = env.get(ENV_DIST_DIR).filter(|v| !v.is_empty()) {
            config.paths.dist_dir = dist.clone();
        }
        if let Some(docs) = env.get(ENV_DOCS_DIR).filter(|v| !v.is_empty()) {
            config.paths.docs_dir = docs.clone();
        }
    }

    /// Apply command-line overrides
    fn apply_overrides(config: &mut ReleaseConfig, overrides: ConfigOverrides) {
        if overrides.repository.is_some() {
            config.repository.name = overrides.repository;
        }
        if overrides.branch.is_some() {
            config.repository.branch = overrides.branch;
        }
        if let Some(version_file) = overrides.version_file {
            config.paths.version_file = version_file;
        }
    }

    /// Expand `${VAR}` references in the repository settings
    fn expand_env_vars(mut config: ReleaseConfig, env: &HashMap<String, String>) -> ReleaseConfig {
        let repository = &mut config.repository;

        for field in [
            &mut repository.name,
            &mut repository.owner,
            &mut repository.url,
            &mut repository.branch,
        ]
        .into_iter()
        .flatten()
        {
            *field = Self::expand_string(field, env);
        }

        repository.commit_message = Self::expand_string(&repository.commit_message, env);
        for part in &mut repository.prepare_command {
            *part = Self::expand_string(part, env);
        }

        config
    }

    /// Expand environment variables in a single string
    fn expand_string(input: &str, env: &HashMap<String, String>) -> String {
        let mut result = input.to_string();
        for cap in ENV_VAR.captures_iter(input) {
            let var_name = &cap[1];

            if let Some(value) = env.get(var_name) {
                result = result.replace(&format!("${{{}}}", var_name), value);
            } else {
                warn!("Environment variable {} not found", var_name);
            }
        }

        result
    }

    /// Validate configuration
    pub fn validate(config: &ReleaseConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Check version
        if config.version.is_empty() {
            errors.push(ConfigValidationError {
                field: "version".to_string(),
                message: "Version is required".to_string(),
            });
        } else if config.version != SCHEMA_VERSION {
            warnings.push(ConfigValidationWarning {
                field: "version".to_string(),
                message: format!("Unknown version: {}", config.version),
                suggestion: Some(format!(
                    "Currently supported version is \"{}\" only",
                    SCHEMA_VERSION
                )),
            });
        }

        // 2. Validate paths
        Self::validate_paths(&config.paths, &mut errors);

        // 3. Validate repository settings
        Self::validate_repository(config, &mut errors, &mut warnings);

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn validate_paths(paths: &PathsConfig, errors: &mut Vec<ConfigValidationError>) {
        let required = [
            ("paths.manifest", &paths.manifest),
            ("paths.distDir", &paths.dist_dir),
            ("paths.docsDir", &paths.docs_dir),
            ("paths.exportRules", &paths.export_rules),
            ("paths.ignoreRules", &paths.ignore_rules),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "Path must not be empty".to_string(),
                });
            }
        }

        if !paths.dist_dir.is_empty() && paths.dist_dir == paths.docs_dir {
            errors.push(ConfigValidationError {
                field: "paths.docsDir".to_string(),
                message: "Docs directory must differ from the dist directory".to_string(),
            });
        }
    }

    fn validate_repository(
        config: &ReleaseConfig,
        errors: &mut Vec<ConfigValidationError>,
        warnings: &mut Vec<ConfigValidationWarning>,
    ) {
        let repository = &config.repository;

        if repository.url.is_none() && repository.host.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "repository.host".to_string(),
                message: "Host is required when no url is configured".to_string(),
            });
        }

        if repository.commit_message.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "repository.commitMessage".to_string(),
                message: "Commit message must not be empty".to_string(),
            });
        }

        if repository
            .prepare_command
            .first()
            .is_some_and(|program| program.trim().is_empty())
        {
            errors.push(ConfigValidationError {
                field: "repository.prepareCommand".to_string(),
                message: "Program name must not be empty".to_string(),
            });
        }

        if repository.checkout_root.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "repository.checkoutRoot".to_string(),
                message: "Checkout root must not be empty".to_string(),
            });
        } else if !repository.checkout_root.starts_with('.') {
            warnings.push(ConfigValidationWarning {
                field: "repository.checkoutRoot".to_string(),
                message: "Checkout root is not hidden and may end up in the package".to_string(),
                suggestion: Some("Use a dot-directory such as .release".to_string()),
            });
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(project: &Path) -> ConfigLoadOptions {
        ConfigLoadOptions {
            project_path: project.to_path_buf(),
            config_file: None,
            overrides: ConfigOverrides::default(),
            env: HashMap::new(),
        }
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(options(temp_dir.path())).unwrap();
        assert_eq!(config, ReleaseConfig::default());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut opts = options(temp_dir.path());
        opts.config_file = Some(temp_dir.path().join("custom.yaml"));

        let err = ConfigLoader::load(opts).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), "\n").unwrap();

        let config = ConfigLoader::load(options(temp_dir.path())).unwrap();
        assert_eq!(config, ReleaseConfig::default());
    }

    #[test]
    fn test_priority_cli_over_env_over_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            "repository:\n  name: from-file\n  branch: file-branch\npaths:\n  distDir: file-dist\n",
        )
        .unwrap();

        let mut opts = options(temp_dir.path());
        opts.env
            .insert(ENV_REPOSITORY.to_string(), "from-env".to_string());
        opts.env
            .insert(ENV_DIST_DIR.to_string(), "env-dist".to_string());
        opts.overrides.repository = Some("from-cli".to_string());

        let config = ConfigLoader::load(opts).unwrap();

        assert_eq!(config.repository.name.as_deref(), Some("from-cli"));
        assert_eq!(config.repository.branch.as_deref(), Some("file-branch"));
        assert_eq!(config.paths.dist_dir, "env-dist");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), "paths: [unclosed").unwrap();

        let err = ConfigLoader::load(options(temp_dir.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML config"));
    }

    #[test]
    fn test_expand_string() {
        let mut env = HashMap::new();
        env.insert("GH_OWNER".to_string(), "someone".to_string());

        let result = ConfigLoader::expand_string("https://github.com/${GH_OWNER}/repo", &env);
        assert_eq!(result, "https://github.com/someone/repo");

        let untouched = ConfigLoader::expand_string("${MISSING_VAR}", &env);
        assert_eq!(untouched, "${MISSING_VAR}");
    }

    #[test]
    fn test_expand_env_vars_in_repository() {
        let mut env = HashMap::new();
        env.insert("OWNER".to_string(), "org".to_string());
        env.insert("PY".to_string(), "python3".to_string());

        let mut config = ReleaseConfig::default();
        config.repository.owner = Some("${OWNER}".to_string());
        config.repository.prepare_command = vec!["${PY}".to_string(), "gen.py".to_string()];

        let expanded = ConfigLoader::expand_env_vars(config, &env);
        assert_eq!(expanded.repository.owner.as_deref(), Some("org"));
        assert_eq!(expanded.repository.prepare_command[0], "python3");
    }

    #[test]
    fn test_validate_defaults() {
        let result = ConfigLoader::validate(&ReleaseConfig::default());
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_version_required() {
        let mut config = ReleaseConfig::default();
        config.version = "".to_string();

        let result = ConfigLoader::validate(&config);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "version");
    }

    #[test]
    fn test_validate_unknown_version_warning() {
        let mut config = ReleaseConfig::default();
        config.version = "2.0".to_string();

        let result = ConfigLoader::validate(&config);

        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "version");
    }

    #[test]
    fn test_validate_docs_dir_equal_to_dist_dir() {
        let mut config = ReleaseConfig::default();
        config.paths.docs_dir = config.paths.dist_dir.clone();

        let result = ConfigLoader::validate(&config);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.field == "paths.docsDir"));
    }

    #[test]
    fn test_validate_visible_checkout_root_warning() {
        let mut config = ReleaseConfig::default();
        config.repository.checkout_root = "checkout".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.valid);
        assert_eq!(result.warnings[0].field, "repository.checkoutRoot");
    }

    #[test]
    fn test_format_validation_result() {
        let result = ConfigValidationResult {
            valid: false,
            errors: vec![ConfigValidationError {
                field: "version".to_string(),
                message: "Version is required".to_string(),
            }],
            warnings: vec![ConfigValidationWarning {
                field: "repository.checkoutRoot".to_string(),
                message: "Checkout root is not hidden".to_string(),
                suggestion: Some("Use .release".to_string()),
            }],
        };

        let formatted = ConfigLoader::format_validation_result(&result);

        assert!(formatted.contains("❌ Configuration has errors"));
        assert!(formatted.contains("🔴 Errors:"));
        assert!(formatted.contains("[version]"));
        assert!(formatted.contains("🟡 Warnings:"));
        assert!(formatted.contains("Suggestion: Use .release"));
    }
}
