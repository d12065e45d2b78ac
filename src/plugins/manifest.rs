//! Manifest cross-check: declared descriptor list vs. files on disk.
//!
//! The manifest is a JSON document (a plugin manifest by default) whose
//! configured key holds a list of paths, one per descriptor file. Every
//! entry is checked on its own, then the declared count is compared with
//! the inventory count.

use crate::core::config::ManifestConfig;
use crate::core::diagnostic::{Diagnostic, IssueKind, Location, Outcome};
use crate::core::error::AgentlintError;
use crate::core::paths;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE: &str = "manifest";

/// Descriptor file names physically present in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    dir: PathBuf,
    files: BTreeSet<String>,
}

impl Inventory {
    /// List regular files in `dir` whose names end with `suffix`.
    pub fn scan(dir: &Path, suffix: &str) -> Result<Self, AgentlintError> {
        let mut files = BTreeSet::new();
        for entry in fs::read_dir(dir).map_err(AgentlintError::IoError)? {
            let entry = entry.map_err(AgentlintError::IoError)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(suffix) {
                    files.insert(name.to_string());
                }
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    pub fn from_names<I, S>(dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            files: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

/// A loaded manifest list.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub path: PathBuf,
    pub key: String,
    pub entries: Vec<Value>,
}

/// Read the manifest list.
///
/// `Ok(None)` means no manifest is in use: the default document or its key
/// is absent. An explicitly named document that is missing is a referential
/// error, and one that exists but cannot be used is a structural error.
pub fn load_manifest(
    root: &Path,
    config: &ManifestConfig,
    explicit: Option<&Path>,
) -> Result<Option<Manifest>, Diagnostic> {
    let path = match explicit {
        Some(p) => root.join(p),
        None => root.join(&config.path),
    };
    let location = Location::source(SOURCE).path(&path);
    if !path.is_file() {
        if explicit.is_some() {
            return Err(Diagnostic::error(
                IssueKind::Referential,
                format!("manifest file not found: {}", path.display()),
                location,
            ));
        }
        tracing::debug!("no manifest at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        Diagnostic::error(
            IssueKind::Structural,
            format!("could not read manifest {}: {}", path.display(), e),
            location.clone(),
        )
    })?;
    let doc: Value = serde_json::from_str(&content).map_err(|e| {
        Diagnostic::error(
            IssueKind::Structural,
            format!("invalid JSON in manifest {}: {}", path.display(), e),
            location.clone(),
        )
    })?;

    match doc.get(&config.key) {
        None => {
            tracing::debug!("manifest {} has no '{}' key", path.display(), config.key);
            Ok(None)
        }
        Some(Value::Array(entries)) => Ok(Some(Manifest {
            path,
            key: config.key.clone(),
            entries: entries.clone(),
        })),
        Some(other) => Err(Diagnostic::error(
            IssueKind::Structural,
            format!(
                "manifest key '{}' must be a list of paths, found {}",
                config.key,
                json_type(other)
            ),
            location.field(config.key.as_str()),
        )),
    }
}

pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn entry_key(entry: &str) -> String {
    paths::normalize_separators(entry.trim_start_matches("./"))
}

fn resolve_entry(entry_root: &Path, entry: &str) -> PathBuf {
    paths::clean(&entry_root.join(paths::normalize_separators(entry)))
}

fn check_entry(
    index: usize,
    entry: &Value,
    manifest: &Manifest,
    entry_root: &Path,
    suffix: &str,
) -> Outcome {
    let location = Location::source(SOURCE)
        .scope(manifest.path.display().to_string())
        .index(index)
        .field(manifest.key.as_str());

    let Value::String(entry) = entry else {
        return Outcome::single(Diagnostic::error(
            IssueKind::Structural,
            format!("entry must be a string, found {}", json_type(entry)),
            location,
        ));
    };

    let mut out = Outcome::new();
    if entry.ends_with(['/', '\\']) {
        out.extend([Diagnostic::error(
            IssueKind::Structural,
            format!(
                "'{}' references a directory; list every agent file individually",
                entry
            ),
            location.clone(),
        )]);
    }
    if !entry.ends_with(suffix) {
        out.extend([Diagnostic::error(
            IssueKind::Schema,
            format!("'{}' does not end with '{}'", entry, suffix),
            location.clone(),
        )]);
    }
    let resolved = resolve_entry(entry_root, entry);
    if !resolved.exists() {
        out.extend([Diagnostic::error(
            IssueKind::Referential,
            format!("'{}' not found: {}", entry, resolved.display()),
            location.path(resolved),
        )]);
    }
    out
}

/// Cross-check a manifest against the inventory.
///
/// Without a manifest this is a no-op and the inventory is not inspected.
pub fn check(
    manifest: Option<&Manifest>,
    inventory: &Inventory,
    entry_root: &Path,
    suffix: &str,
) -> Outcome {
    let Some(manifest) = manifest else {
        return Outcome::new();
    };
    tracing::debug!(
        "cross-checking {} manifest entries against {} files",
        manifest.entries.len(),
        inventory.len()
    );

    let per_entry: Outcome = manifest
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| check_entry(i, entry, manifest, entry_root, suffix))
        .collect();

    let mut seen = HashSet::new();
    let duplicates: Outcome = manifest
        .entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let entry = entry.as_str()?;
            if seen.insert(entry_key(entry)) {
                return None;
            }
            Some(Diagnostic::warning(
                IssueKind::Referential,
                format!("'{}' is listed more than once", entry),
                Location::source(SOURCE)
                    .scope(manifest.path.display().to_string())
                    .index(i)
                    .field(manifest.key.as_str()),
            ))
        })
        .collect();

    let manifest_location = Location::source(SOURCE).scope(manifest.path.display().to_string());
    let count = if manifest.entries.len() != inventory.len() {
        Outcome::single(Diagnostic::error(
            IssueKind::Referential,
            format!(
                "manifest declares {} agent file(s) but {} exist in {}",
                manifest.entries.len(),
                inventory.len(),
                inventory.dir().display()
            ),
            manifest_location.clone(),
        ))
    } else {
        Outcome::new()
    };

    let declared: HashSet<PathBuf> = manifest
        .entries
        .iter()
        .filter_map(Value::as_str)
        .map(|entry| resolve_entry(entry_root, entry))
        .collect();
    let undeclared: Outcome = inventory
        .iter()
        .filter(|name| !declared.contains(&paths::clean(&inventory.dir().join(name))))
        .map(|name| {
            Diagnostic::warning(
                IssueKind::Referential,
                format!("'{}' exists on disk but is not declared in the manifest", name),
                manifest_location.clone().field(name),
            )
        })
        .collect();

    per_entry.merge(duplicates).merge(count).merge(undeclared)
}
