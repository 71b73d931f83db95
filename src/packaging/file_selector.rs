//! File selector - decides which top-level entries go into the package
//!
//! Matching is literal: a rule removes an entry only when, after trimming
//! leading and trailing `/`, it equals the entry name exactly. Patterns such
//! as `*.pyc` are not expanded.

use crate::core::error::{ReleaseError, ReleaseResult};
use std::fs;
use std::io;
use std::path::{Component, Path};
use tracing::debug;

/// Marker for hidden entries
const HIDDEN_PREFIX: char = '.';

/// Attribute marking an entry as excluded from exports
const EXPORT_IGNORE: &str = "export-ignore";

/// Ordered set of top-level entry names selected for packaging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<String>,
}

impl FileSet {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != name);
        before != self.entries.len()
    }
}

/// Selects release files from a project directory
pub struct FileSelector<'a> {
    project_dir: &'a Path,
    export_rules: &'a Path,
    ignore_rules: &'a Path,
    /// Top-level entries the tool itself writes (dist, docs, version file)
    outputs: Vec<String>,
}

impl<'a> FileSelector<'a> {
    /// `export_rules` and `ignore_rules` are resolved against `project_dir`
    /// unless absolute.
    pub fn new(project_dir: &'a Path, export_rules: &'a Path, ignore_rules: &'a Path) -> Self {
        Self {
            project_dir,
            export_rules,
            ignore_rules,
            outputs: Vec::new(),
        }
    }

    /// Never select the given output locations.
    ///
    /// Only outputs naming a top-level entry of the project have an effect;
    /// empty paths and paths outside the project are skipped.
    pub fn with_outputs<P: AsRef<Path>>(mut self, outputs: impl IntoIterator<Item = P>) -> Self {
        for output in outputs {
            if let Some(name) = top_level_name(self.project_dir, output.as_ref()) {
                self.outputs.push(name);
            }
        }
        self
    }

    /// List non-hidden top-level entries minus every excluded one.
    ///
    /// # Errors
    ///
    /// `RuleFileMissing` when either rule file does not exist.
    pub fn select(&self) -> ReleaseResult<FileSet> {
        let mut files = self.list_visible_entries()?;

        for output in &self.outputs {
            if files.remove(output) {
                debug!(entry = %output, "Excluded as release output");
            }
        }

        let export_rules = self.read_rules(self.export_rules)?;
        for path in parse_export_rules(&export_rules) {
            if files.remove(&path) {
                debug!(entry = %path, "Excluded by export-ignore");
            }
        }

        let ignore_rules = self.read_rules(self.ignore_rules)?;
        for path in parse_ignore_rules(&ignore_rules) {
            if files.remove(&path) {
                debug!(entry = %path, "Excluded by ignore rule");
            }
        }

        Ok(files)
    }

    fn list_visible_entries(&self) -> ReleaseResult<FileSet> {
        let read_dir = fs::read_dir(self.project_dir).map_err(|e| {
            ReleaseError::io(
                format!("Failed to list {}", self.project_dir.display()),
                e,
            )
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                ReleaseError::io(format!("Failed to list {}", self.project_dir.display()), e)
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(HIDDEN_PREFIX) {
                entries.push(name);
            }
        }
        entries.sort();

        Ok(FileSet { entries })
    }

    fn read_rules(&self, rules: &Path) -> ReleaseResult<String> {
        let path = self.project_dir.join(rules);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReleaseError::RuleFileMissing { path },
            _ => ReleaseError::io(format!("Failed to read {}", path.display()), e),
        })
    }
}

/// Paths carrying the `export-ignore` attribute
pub fn parse_export_rules(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let path = tokens.next()?;
            tokens
                .any(|attr| attr == EXPORT_IGNORE)
                .then(|| normalize_rule(path))
        })
        .collect()
}

/// One bare path per non-blank line
pub fn parse_ignore_rules(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(normalize_rule)
        .collect()
}

fn normalize_rule(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Name of the top-level project entry `path` refers to, if it is one
fn top_level_name(project_dir: &Path, path: &Path) -> Option<String> {
    let relative = if path.is_absolute() {
        path.strip_prefix(project_dir).ok()?
    } else {
        path
    };

    let mut names = relative.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    });
    let name = names.next()?;
    names.next().is_none().then_some(name)
}
