//! Release metadata record for CI consumers
//!
//! A single JSON line `{"version","name","id","dest"}` that an orchestrator
//! reads from the step output. Bracketed tags (`[COLOR red]`, `[Beta]`) are
//! removed from the display name; nothing else is normalized.

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::manifest::Manifest;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

lazy_static! {
    static ref BRACKET_TAG: Regex =
        Regex::new(r"\[[^\]]+\]").expect("bracket tag pattern is valid");
}

/// Metadata describing a produced artifact. Field order is the output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseMetadata {
    pub version: String,
    pub name: String,
    pub id: String,
    pub dest: String,
}

impl ReleaseMetadata {
    /// `dest` is the staging directory as reported to consumers, normally
    /// relative to the project (`dist/<id>`).
    pub fn new(manifest: &Manifest, dest: &Path) -> Self {
        Self {
            version: manifest.version.clone(),
            name: strip_tags(&manifest.name),
            id: manifest.id.clone(),
            dest: dest.display().to_string(),
        }
    }

    /// Serialize to one line of JSON
    pub fn to_json_line(&self) -> ReleaseResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ReleaseError::io("Failed to serialize metadata", e.into()))
    }

    /// Write the JSON line followed by a newline
    pub fn emit(&self, out: &mut impl Write) -> ReleaseResult<()> {
        let line = self.to_json_line()?;
        writeln!(out, "{}", line).map_err(|e| ReleaseError::io("Failed to write metadata", e))
    }
}

/// Remove every `[...]` tag from an addon name
pub fn strip_tags(name: &str) -> String {
    BRACKET_TAG.replace_all(name, "").into_owned()
}
