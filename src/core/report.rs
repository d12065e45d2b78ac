//! Report aggregation and rendering.
//!
//! A [`Report`] is a list of sections, one per checked source (descriptor
//! directory, manifest, each hook settings file). Rendering groups each
//! section's diagnostics by scope (file or lifecycle) and prints one line
//! per issue, followed by numbered remediation hints when errors exist and
//! a summary block.

use crate::core::diagnostic::{Diagnostic, Location, Outcome, Severity};
use crate::core::error::AgentlintError;
use crate::core::output::{compact_line, preview_list};
use crate::core::tui::{self, ItemStatus};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

const MAX_MESSAGE_CHARS: usize = 240;

/// Canned advice keyed by a substring of the error message. Each entry is
/// shown at most once.
const REMEDIATIONS: &[(&str, &str)] = &[
    (
        "script file not found",
        "Create the missing script or fix its path in the hook command. Relative paths resolve against the project root; use $CLAUDE_PROJECT_DIR for portability.",
    ),
    (
        "timeout",
        "Set timeouts as plain numbers of seconds inside the allowed range. Slow work belongs in a background process, not a blocking hook.",
    ),
    (
        "missing top-level 'hooks' key",
        "Nest lifecycle entries under a top-level \"hooks\" object in the settings file.",
    ),
    (
        "unknown lifecycle",
        "Lifecycle names are case-sensitive; check the spelling against the supported list.",
    ),
    (
        "'hooks' action list",
        "Give every matcher entry a \"hooks\" list of {\"type\": \"command\", \"command\": ...} actions.",
    ),
    (
        "missing required field",
        "Add the field to the descriptor header between the opening and closing '---' lines.",
    ),
    (
        "invalid model",
        "Use one of the listed model names, or 'inherit' to follow the session model.",
    ),
    (
        "header",
        "Start each descriptor with a '---' line, the header fields, then a closing '---' line.",
    ),
    (
        "agent file(s) but",
        "Update the manifest so it lists every descriptor file exactly once.",
    ),
    (
        "references a directory",
        "List descriptor files individually in the manifest instead of their directory.",
    ),
    (
        "invalid JSON",
        "Fix the JSON syntax; trailing commas and unquoted keys are the usual culprits.",
    ),
];

/// One checked (or skipped) source.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// False when the source did not exist.
    pub checked: bool,
    pub outcome: Outcome,
}

impl Section {
    pub fn new(title: impl Into<String>, path: Option<PathBuf>, outcome: Outcome) -> Self {
        Self {
            title: title.into(),
            path,
            checked: true,
            outcome,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.checked = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub sources: usize,
    pub descriptors: usize,
    pub hook_entries: usize,
    pub errors: usize,
    pub warnings: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
    pub descriptors: usize,
    pub hook_entries: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sections: &'a [Section],
    remediations: Vec<&'static str>,
    summary: Summary,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Every diagnostic in section order.
    pub fn outcome(&self) -> Outcome {
        self.sections.iter().map(|s| s.outcome.clone()).collect()
    }

    pub fn summary(&self) -> Summary {
        let outcome = self.outcome();
        Summary {
            sources: self.sections.iter().filter(|s| s.checked).count(),
            descriptors: self.descriptors,
            hook_entries: self.hook_entries,
            errors: outcome.error_count(),
            warnings: outcome.warning_count(),
            passed: !outcome.has_errors(),
        }
    }

    /// Advice for the errors present, in table order.
    pub fn remediations(&self) -> Vec<&'static str> {
        let outcome = self.outcome();
        REMEDIATIONS
            .iter()
            .filter(|(needle, _)| outcome.errors().any(|d| d.message.contains(needle)))
            .map(|(_, advice)| *advice)
            .collect()
    }

    /// One uncoloured `error: <location>: <message>` line per error, for
    /// stderr.
    pub fn error_lines(&self) -> Vec<String> {
        self.outcome()
            .errors()
            .map(|d| format!("{}: {}: {}", d.severity, d.location, d.message))
            .collect()
    }

    pub fn render(&self, verbose: bool) -> String {
        let mut out = tui::banner("agentlint", ItemStatus::Info);
        for section in &self.sections {
            out.push_str(&render_section(section, verbose));
        }

        let remediations = self.remediations();
        if !remediations.is_empty() {
            out.push_str(&tui::section("Suggested fixes"));
            for (n, advice) in remediations.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", n + 1, advice);
            }
        }

        out.push_str(&self.render_summary());
        out
    }

    fn render_summary(&self) -> String {
        let summary = self.summary();
        let mut out = tui::section("Summary");
        let _ = writeln!(out, "  Sources checked:      {}", summary.sources);
        let _ = writeln!(out, "  Descriptors checked:  {}", summary.descriptors);
        let _ = writeln!(out, "  Hook entries checked: {}", summary.hook_entries);
        let _ = writeln!(out, "  Errors:               {}", summary.errors);
        let _ = writeln!(out, "  Warnings:             {}", summary.warnings);

        let failing: Vec<&str> = self
            .sections
            .iter()
            .filter(|s| s.outcome.has_errors())
            .map(|s| s.title.as_str())
            .collect();
        out.push('\n');
        if summary.passed {
            out.push_str(&tui::status_line(2, "PASS", ItemStatus::Pass));
        } else {
            let line = format!("FAIL ({})", preview_list(&failing, 4, 40));
            out.push_str(&tui::status_line(2, &line, ItemStatus::Fail));
        }
        out
    }

    pub fn to_json(&self) -> Result<String, AgentlintError> {
        let doc = JsonReport {
            sections: &self.sections,
            remediations: self.remediations(),
            summary: self.summary(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

fn render_section(section: &Section, verbose: bool) -> String {
    let mut title = section.title.clone();
    if let Some(path) = &section.path {
        let _ = write!(title, " ({})", path.display());
    }
    let mut out = tui::section(&title);

    let visible: Vec<&Diagnostic> = section
        .outcome
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info || !section.checked)
        .collect();
    if visible.is_empty() {
        out.push_str(&tui::status_line(2, "no issues", ItemStatus::Pass));
        return out;
    }

    let mut scope: Option<&str> = None;
    for diagnostic in visible {
        let this_scope = diagnostic.location.scope.as_deref();
        if this_scope.is_some() && this_scope != scope {
            out.push_str(&tui::heading(2, this_scope.unwrap_or_default()));
        }
        scope = this_scope;

        let indent = if scope.is_some() { 4 } else { 2 };
        let status = if section.checked {
            ItemStatus::from(diagnostic.severity)
        } else {
            ItemStatus::Skipped
        };
        out.push_str(&tui::status_line(indent, &issue_line(diagnostic), status));
    }
    out
}

/// `error [range] entry 0 > action 1 > timeout: message`
fn issue_line(diagnostic: &Diagnostic) -> String {
    let message = compact_line(&diagnostic.message, MAX_MESSAGE_CHARS);
    match detail(&diagnostic.location) {
        Some(detail) => format!(
            "{} [{}] {}: {}",
            diagnostic.severity, diagnostic.kind, detail, message
        ),
        None => format!("{} [{}] {}", diagnostic.severity, diagnostic.kind, message),
    }
}

/// The part of a location below its scope.
fn detail(location: &Location) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(index) = location.index {
        parts.push(format!("entry {}", index));
    }
    if let Some(action) = location.action {
        parts.push(format!("action {}", action));
    }
    if let Some(field) = &location.field {
        parts.push(field.clone());
    }
    (!parts.is_empty()).then(|| parts.join(" > "))
}
