//! Manifest Validator - sanity checks on the addon identity before packaging
//!
//! The id ends up in directory and archive names, so it must be a single path
//! component. Versions that are not SemVer are accepted with a warning.
//!
//! # Example
//!
//! ```
//! use addon_release::core::manifest::Manifest;
//! use addon_release::validation::ManifestValidator;
//!
//! let manifest = Manifest::parse(r#"<addon id="x" name="X" version="1.2.3"/>"#).unwrap();
//! let result = ManifestValidator::new().validate(&manifest);
//! assert!(result.is_valid);
//! ```

use crate::core::manifest::Manifest;
use serde::Serialize;

/// Result of manifest validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Whether the manifest is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings
    pub warnings: Vec<String>,
}

/// Validator for addon manifests
pub struct ManifestValidator;

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the identity fields of a parsed manifest
    pub fn validate(&self, manifest: &Manifest) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.validate_id(&manifest.id, &mut errors);

        if manifest.name.trim().is_empty() {
            errors.push("name is empty".to_string());
        }

        self.validate_version(&manifest.version, &mut errors, &mut warnings);

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn validate_id(&self, id: &str, errors: &mut Vec<String>) {
        if id.is_empty() {
            errors.push("id is empty".to_string());
            return;
        }

        if id == "." || id == ".." {
            errors.push(format!("id '{}' is not a valid directory name", id));
        }

        if id.contains(['/', '\\']) {
            errors.push(format!("id '{}' contains a path separator", id));
        }

        if id.chars().any(char::is_whitespace) {
            errors.push(format!("id '{}' contains whitespace", id));
        }
    }

    fn validate_version(&self, version: &str, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
        if version.trim().is_empty() {
            errors.push("version is empty".to_string());
            return;
        }

        if version.contains(['/', '\\']) {
            errors.push(format!("version '{}' contains a path separator", version));
            return;
        }

        if semver::Version::parse(version).is_err() {
            warnings.push(format!(
                "version '{}' is not valid SemVer (e.g. 1.0.0)",
                version
            ));
        }
    }
}
