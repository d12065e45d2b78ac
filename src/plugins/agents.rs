//! Agent descriptor validation.
//!
//! Walks the descriptor directory, parses each document's header block,
//! applies the field schema, then hands the inventory to the manifest
//! cross-check. A document that cannot be read or has no header produces
//! one structural error and the batch moves on.

use crate::core::config::{AgentsConfig, Config};
use crate::core::diagnostic::{Diagnostic, IssueKind, Location, Outcome};
use crate::core::error::AgentlintError;
use crate::core::frontmatter::{self, Document, FieldValue};
use crate::plugins::manifest::{self, Inventory};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE: &str = "agents";

#[derive(Debug, Clone, Default)]
pub struct AgentsOptions {
    /// Overrides `agents.dir`.
    pub dir: Option<PathBuf>,
    /// Overrides `manifest.path`.
    pub manifest: Option<PathBuf>,
    pub skip_manifest: bool,
}

/// Result of one descriptor batch.
#[derive(Debug, Clone)]
pub struct AgentsRun {
    pub dir: PathBuf,
    pub documents: usize,
    pub outcome: Outcome,
    pub manifest: Option<ManifestRun>,
}

#[derive(Debug, Clone)]
pub struct ManifestRun {
    pub path: PathBuf,
    pub entries: usize,
    pub outcome: Outcome,
}

/// Validate one parsed descriptor against the field schema.
///
/// `file_stem` is the file name without its suffix; `file_label` is used in
/// locations.
pub fn validate_descriptor(
    doc: &Document,
    file_stem: &str,
    file_label: &str,
    rules: &AgentsConfig,
) -> Outcome {
    let header = &doc.header;
    let at = |field: &str| Location::source(SOURCE).scope(file_label).field(field);
    let mut out = Vec::new();

    for field in &rules.required_fields {
        match header.get(field) {
            None => out.push(Diagnostic::error(
                IssueKind::Schema,
                format!("missing required field '{}'", field),
                at(field.as_str()),
            )),
            Some(value) if value.is_empty() => out.push(Diagnostic::error(
                IssueKind::Schema,
                format!("missing required field '{}' (present but empty)", field),
                at(field.as_str()),
            )),
            Some(_) => {}
        }
    }

    match header.get("name") {
        Some(FieldValue::Scalar(name)) if !name.trim().is_empty() && name != file_stem => {
            out.push(Diagnostic::warning(
                IssueKind::Syntax,
                format!(
                    "name '{}' does not match file name '{}'",
                    name, file_stem
                ),
                at("name"),
            ));
        }
        Some(FieldValue::List(items)) if !items.is_empty() => out.push(Diagnostic::error(
            IssueKind::Schema,
            "field 'name' must be a single value, found a list",
            at("name"),
        )),
        _ => {}
    }

    if let Some(model) = header.get("model") {
        let valid = model
            .as_scalar()
            .is_some_and(|m| rules.models.iter().any(|v| v == m));
        if !valid {
            let shown = match model {
                FieldValue::Scalar(s) => s.clone(),
                FieldValue::List(items) => format!("[{}]", items.join(", ")),
            };
            out.push(Diagnostic::error(
                IssueKind::Schema,
                format!(
                    "invalid model '{}': expected one of {}",
                    shown,
                    rules.models.join(", ")
                ),
                at("model"),
            ));
        }
    }

    if let Some(FieldValue::Scalar(description)) = header.get("description") {
        let len = description.trim().chars().count();
        if len > 0 && len < rules.min_description_chars {
            out.push(Diagnostic::warning(
                IssueKind::Advisory,
                format!(
                    "description is {} characters; at least {} recommended",
                    len, rules.min_description_chars
                ),
                at("description"),
            ));
        }
    }

    if header.get("skills").is_some_and(FieldValue::is_empty) {
        out.push(Diagnostic::warning(
            IssueKind::Advisory,
            "skills is declared but lists nothing",
            at("skills"),
        ));
    }

    let body_len = doc.body.trim().chars().count();
    if body_len < rules.min_body_chars {
        out.push(Diagnostic::warning(
            IssueKind::Advisory,
            format!(
                "insufficient content: body has {} characters, at least {} expected",
                body_len, rules.min_body_chars
            ),
            Location::source(SOURCE).scope(file_label).field("body"),
        ));
    }

    out.into_iter().collect()
}

/// Read, parse and validate one descriptor file.
pub fn validate_file(path: &Path, rules: &AgentsConfig) -> Outcome {
    let file_label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let stem = file_label
        .strip_suffix(rules.suffix.as_str())
        .unwrap_or(&file_label)
        .to_string();
    let location = Location::source(SOURCE).scope(&file_label).path(path);

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("could not read {}: {}", path.display(), e);
            return Outcome::single(Diagnostic::error(
                IssueKind::Structural,
                format!("could not read descriptor: {}", e),
                location,
            ));
        }
    };

    match frontmatter::parse_document(&text) {
        Ok(doc) => validate_descriptor(&doc, &stem, &file_label, rules),
        Err(e) => Outcome::single(Diagnostic::error(
            IssueKind::Structural,
            e.to_string(),
            location,
        )),
    }
}

/// Validate every descriptor in the configured directory and cross-check
/// the manifest.
///
/// A missing directory aborts the whole run before any document is read.
pub fn run_agents(
    root: &Path,
    config: &Config,
    options: &AgentsOptions,
) -> Result<AgentsRun, AgentlintError> {
    let dir = root.join(
        options
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.agents.dir)),
    );
    if !dir.is_dir() {
        return Err(AgentlintError::NotFound(format!(
            "descriptor directory {}",
            dir.display()
        )));
    }

    let inventory = Inventory::scan(&dir, &config.agents.suffix)?;
    tracing::debug!("validating {} descriptors in {}", inventory.len(), dir.display());

    let mut outcome: Outcome = inventory
        .iter()
        .map(|name| {
            tracing::debug!("descriptor {}", name);
            validate_file(&dir.join(name), &config.agents)
        })
        .collect();

    let manifest = if options.skip_manifest {
        None
    } else {
        match manifest::load_manifest(root, &config.manifest, options.manifest.as_deref()) {
            Ok(None) => {
                let path = root.join(
                    options
                        .manifest
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(&config.manifest.path)),
                );
                if path.is_file() {
                    outcome.extend([Diagnostic::info(
                        format!(
                            "manifest has no '{}' list; cross-check skipped",
                            config.manifest.key
                        ),
                        Location::source(manifest::SOURCE).path(path),
                    )]);
                }
                None
            }
            Ok(Some(m)) => {
                let entry_root = root.join(&config.manifest.root);
                let checked = manifest::check(
                    Some(&m),
                    &inventory,
                    &entry_root,
                    &config.agents.suffix,
                );
                Some(ManifestRun {
                    path: m.path.clone(),
                    entries: m.entries.len(),
                    outcome: checked,
                })
            }
            Err(diagnostic) => Some(ManifestRun {
                path: diagnostic
                    .location
                    .path
                    .clone()
                    .unwrap_or_else(|| root.join(&config.manifest.path)),
                entries: 0,
                outcome: Outcome::single(diagnostic),
            }),
        }
    };

    Ok(AgentsRun {
        dir,
        documents: inventory.len(),
        outcome,
        manifest,
    })
}
