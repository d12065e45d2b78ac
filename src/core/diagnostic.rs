//! Diagnostic values shared by every validator.
//!
//! A validator never threads counters through its loops. It returns an
//! [`Outcome`] holding the diagnostics it produced, and callers combine
//! outcomes by concatenation. Totals are always derived from the list.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// What class of rule produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Malformed or missing header, wrong-typed container.
    Structural,
    /// Missing or invalid required/enumerated field.
    Schema,
    /// Referenced file missing, inventory/manifest drift.
    Referential,
    /// Numeric value outside permitted bounds.
    Range,
    /// Matcher or naming heuristic mismatch.
    Syntax,
    /// Informational notes and soft recommendations.
    Advisory,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => write!(f, "structural"),
            Self::Schema => write!(f, "schema"),
            Self::Referential => write!(f, "referential"),
            Self::Range => write!(f, "range"),
            Self::Syntax => write!(f, "syntax"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

/// Where a diagnostic points: source, then lifecycle or file, then entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Location {
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn action(mut self, action: usize) -> Self {
        self.action = Some(action);
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if let Some(scope) = &self.scope {
            write!(f, " > {}", scope)?;
        }
        if let Some(index) = self.index {
            write!(f, " > entry {}", index)?;
        }
        if let Some(action) = self.action {
            write!(f, " > action {}", action)?;
        }
        if let Some(field) = &self.field {
            write!(f, " > {}", field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn error(kind: IssueKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn info(message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Info,
            kind: IssueKind::Advisory,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// The result of one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }

    /// Concatenate two outcomes, preserving order.
    pub fn merge(mut self, other: Outcome) -> Self {
        self.diagnostics.extend(other.diagnostics);
        self
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl FromIterator<Diagnostic> for Outcome {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<Outcome> for Outcome {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().fold(Outcome::new(), Outcome::merge)
    }
}

impl Extend<Diagnostic> for Outcome {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_concatenates_in_order() {
        let a = Outcome::single(Diagnostic::error(
            IssueKind::Schema,
            "first",
            Location::source("a"),
        ));
        let b = Outcome::single(Diagnostic::warning(
            IssueKind::Syntax,
            "second",
            Location::source("b"),
        ));
        let merged = a.merge(b);
        assert_eq!(merged.diagnostics.len(), 2);
        assert_eq!(merged.diagnostics[0].message, "first");
        assert_eq!(merged.error_count(), 1);
        assert_eq!(merged.warning_count(), 1);
        assert!(merged.has_errors());
    }

    #[test]
    fn location_display_includes_every_level() {
        let loc = Location::source("project")
            .scope("PreToolUse")
            .index(2)
            .action(0)
            .field("timeout");
        assert_eq!(
            loc.to_string(),
            "project > PreToolUse > entry 2 > action 0 > timeout"
        );
    }

    #[test]
    fn info_is_neither_error_nor_warning() {
        let outcome = Outcome::single(Diagnostic::info("note", Location::source("x")));
        assert_eq!(outcome.error_count(), 0);
        assert_eq!(outcome.warning_count(), 0);
        assert!(!outcome.is_empty());
    }
}
