//! Hook registry validation.
//!
//! A settings document maps lifecycle names to matcher entries, and each
//! entry carries a list of actions:
//!
//! ```json
//! { "hooks": { "PreToolUse": [
//!     { "matcher": "Write|Edit",
//!       "hooks": [{ "type": "command", "command": "python3 hooks/fmt.py", "timeout": 30 }] }
//! ] } }
//! ```
//!
//! Each source is validated on its own. Problems in one lifecycle or entry
//! never stop the rest of the document from being checked.

use crate::core::command::{Invocation, parse_command};
use crate::core::config::{Config, HooksConfig};
use crate::core::diagnostic::{Diagnostic, IssueKind, Location, Outcome};
use crate::core::paths::PathResolver;
use crate::plugins::manifest::json_type;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

/// `*`, `Name`, `A|B|C` or `Name(args)`.
static MATCHER_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    let ident = r"[A-Za-z_][A-Za-z0-9_-]*";
    Regex::new(&format!(r"^(?:\*|{ident}(?:\|{ident})*|{ident}\([^()]*\))$"))
        .expect("matcher grammar is valid")
});

/// One settings document to validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSource {
    pub label: String,
    pub path: PathBuf,
}

/// Which sources a run covers. Neither flag set means both.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookSelection {
    pub global: bool,
    pub project: bool,
}

impl HookSelection {
    fn wants_global(&self) -> bool {
        self.global || !self.project
    }

    fn wants_project(&self) -> bool {
        self.project || !self.global
    }
}

pub fn hook_sources(
    rules: &HooksConfig,
    resolver: &PathResolver,
    selection: HookSelection,
) -> Vec<HookSource> {
    let mut sources = Vec::new();
    if selection.wants_global() {
        sources.push(HookSource {
            label: "global".to_string(),
            path: resolver.resolve(&rules.global),
        });
    }
    if selection.wants_project() {
        sources.push(HookSource {
            label: "project".to_string(),
            path: resolver.resolve(&rules.project),
        });
    }
    sources
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleSummary {
    pub name: String,
    pub entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub hooks: usize,
}

/// Validation result for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// False when the source did not exist and was skipped.
    pub loaded: bool,
    pub lifecycles: Vec<LifecycleSummary>,
    pub outcome: Outcome,
}

impl SourceReport {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            path: None,
            loaded: true,
            lifecycles: Vec::new(),
            outcome: Outcome::new(),
        }
    }

    pub fn hooks(&self) -> usize {
        self.lifecycles.iter().map(|l| l.entries).sum()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            errors: self.outcome.error_count(),
            warnings: self.outcome.warning_count(),
            hooks: self.hooks(),
        }
    }
}

/// Everything a check needs besides the document itself.
pub struct HookValidator<'a> {
    rules: &'a HooksConfig,
    resolver: &'a PathResolver,
}

impl<'a> HookValidator<'a> {
    pub fn new(rules: &'a HooksConfig, resolver: &'a PathResolver) -> Self {
        Self { rules, resolver }
    }

    /// Validate one parsed settings document.
    pub fn validate(&self, settings: &Value, label: &str) -> SourceReport {
        let mut report = SourceReport::new(label);
        let top = Location::source(label);

        let Some(root) = settings.as_object() else {
            report.outcome = Outcome::single(Diagnostic::error(
                IssueKind::Structural,
                format!(
                    "settings must be a JSON object, found {}",
                    json_type(settings)
                ),
                top,
            ));
            return report;
        };
        let hooks = match root.get("hooks") {
            None => {
                report.outcome = Outcome::single(Diagnostic::error(
                    IssueKind::Structural,
                    "missing top-level 'hooks' key",
                    top,
                ));
                return report;
            }
            Some(Value::Object(map)) => map,
            Some(other) => {
                report.outcome = Outcome::single(Diagnostic::error(
                    IssueKind::Structural,
                    format!(
                        "'hooks' must map lifecycle names to entry lists, found {}",
                        json_type(other)
                    ),
                    top.field("hooks"),
                ));
                return report;
            }
        };

        for (lifecycle, value) in hooks {
            tracing::debug!("{}: lifecycle {}", label, lifecycle);
            let (summary, outcome) = self.check_lifecycle(label, lifecycle, value);
            report.lifecycles.extend(summary);
            report.outcome = std::mem::take(&mut report.outcome).merge(outcome);
        }
        report
    }

    fn check_lifecycle(
        &self,
        label: &str,
        lifecycle: &str,
        value: &Value,
    ) -> (Option<LifecycleSummary>, Outcome) {
        let at = Location::source(label).scope(lifecycle);
        if !self.rules.is_lifecycle(lifecycle) {
            let err = Diagnostic::error(
                IssueKind::Schema,
                format!(
                    "unknown lifecycle '{}': expected one of {}",
                    lifecycle,
                    self.rules.lifecycles.join(", ")
                ),
                at,
            );
            return (None, Outcome::single(err));
        }
        let Value::Array(entries) = value else {
            let err = Diagnostic::error(
                IssueKind::Structural,
                format!(
                    "lifecycle '{}' must be a list of matcher entries, found {}",
                    lifecycle,
                    json_type(value)
                ),
                at,
            );
            return (None, Outcome::single(err));
        };

        let outcome: Outcome = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.check_entry(at.clone().index(index), lifecycle, entry))
            .collect();
        let summary = LifecycleSummary {
            name: lifecycle.to_string(),
            entries: entries.len(),
        };
        (Some(summary), outcome)
    }

    fn check_entry(&self, at: Location, lifecycle: &str, entry: &Value) -> Outcome {
        let Value::Object(entry) = entry else {
            return Outcome::single(Diagnostic::error(
                IssueKind::Structural,
                format!("matcher entry must be an object, found {}", json_type(entry)),
                at,
            ));
        };

        let mut out = Outcome::new();
        out.extend(check_matcher(entry.get("matcher"), &at));

        let actions = match entry.get("hooks") {
            Some(Value::Array(actions)) => actions,
            None => {
                out.extend([Diagnostic::error(
                    IssueKind::Structural,
                    "entry has no 'hooks' action list",
                    at.field("hooks"),
                )]);
                return out;
            }
            Some(other) => {
                out.extend([Diagnostic::error(
                    IssueKind::Structural,
                    format!("'hooks' must be a list of actions, found {}", json_type(other)),
                    at.field("hooks"),
                )]);
                return out;
            }
        };

        actions
            .iter()
            .enumerate()
            .map(|(i, action)| self.check_action(at.clone().action(i), lifecycle, action))
            .fold(out, Outcome::merge)
    }

    fn check_action(&self, at: Location, lifecycle: &str, action: &Value) -> Outcome {
        let Value::Object(action) = action else {
            return Outcome::single(Diagnostic::error(
                IssueKind::Structural,
                format!("action must be an object, found {}", json_type(action)),
                at,
            ));
        };
        let mut out = Outcome::new();

        match action.get("type") {
            Some(Value::String(kind)) if self.rules.is_action_type(kind) => {}
            Some(Value::String(kind)) => out.extend([Diagnostic::error(
                IssueKind::Schema,
                format!(
                    "unsupported action type '{}': expected one of {}",
                    kind,
                    self.rules.action_types.join(", ")
                ),
                at.clone().field("type"),
            )]),
            Some(other) => out.extend([Diagnostic::error(
                IssueKind::Schema,
                format!("action type must be a string, found {}", json_type(other)),
                at.clone().field("type"),
            )]),
            None => out.extend([Diagnostic::error(
                IssueKind::Schema,
                "action is missing 'type'",
                at.clone().field("type"),
            )]),
        }

        match action.get("command") {
            Some(Value::String(command)) => out.extend(self.check_command(command, &at)),
            Some(other) => out.extend([Diagnostic::error(
                IssueKind::Schema,
                format!("command must be a string, found {}", json_type(other)),
                at.clone().field("command"),
            )]),
            None => out.extend([Diagnostic::error(
                IssueKind::Schema,
                "action is missing 'command'",
                at.clone().field("command"),
            )]),
        }

        out.extend(self.check_timeout(action, lifecycle, at));
        out
    }

    fn check_command(&self, command: &str, at: &Location) -> Option<Diagnostic> {
        let at = at.clone().field("command");
        match parse_command(command, &self.rules.interpreters) {
            Invocation::Unparseable { reason } => Some(Diagnostic::warning(
                IssueKind::Syntax,
                format!("script path not verified: {}", reason),
                at,
            )),
            invocation => {
                let raw = invocation.script_path()?;
                let resolved = self.resolver.resolve(raw);
                tracing::debug!("{} -> {}", raw, resolved.display());
                if resolved.is_file() {
                    None
                } else {
                    Some(Diagnostic::error(
                        IssueKind::Referential,
                        format!("script file not found: {}", resolved.display()),
                        at.path(resolved),
                    ))
                }
            }
        }
    }

    fn check_timeout(
        &self,
        action: &Map<String, Value>,
        lifecycle: &str,
        at: Location,
    ) -> Option<Diagnostic> {
        let at = at.field("timeout");
        let (min, max) = (self.rules.min_timeout, self.rules.max_timeout);
        let value = match action.get("timeout") {
            None => {
                return Some(Diagnostic::info(
                    format!(
                        "no timeout set; the default of {}s applies",
                        self.rules.default_timeout
                    ),
                    at,
                ));
            }
            Some(Value::Number(n)) => n,
            Some(other) => {
                return Some(Diagnostic::error(
                    IssueKind::Range,
                    format!(
                        "timeout must be a number of seconds, found {}",
                        json_type(other)
                    ),
                    at,
                ));
            }
        };

        let seconds = value.as_f64().unwrap_or(f64::NAN);
        if !(seconds >= min as f64 && seconds <= max as f64) {
            return Some(Diagnostic::error(
                IssueKind::Range,
                format!(
                    "timeout {} is outside the allowed range [{}, {}] seconds",
                    display_number(value),
                    min,
                    max
                ),
                at,
            ));
        }

        let recommended = self.rules.recommended_timeout(lifecycle)?;
        if seconds < recommended as f64 / 10.0 {
            return Some(Diagnostic::warning(
                IssueKind::Advisory,
                format!(
                    "timeout {}s is far below the {}s recommended for {}",
                    display_number(value),
                    recommended,
                    lifecycle
                ),
                at,
            ));
        }
        None
    }

    /// Load and validate one source. A file that does not exist is skipped.
    pub fn check_source(&self, source: &HookSource) -> SourceReport {
        let mut report = SourceReport::new(&source.label);
        report.path = Some(source.path.clone());
        let at = Location::source(&source.label).path(&source.path);

        if !source.path.exists() {
            report.loaded = false;
            report.outcome = Outcome::single(Diagnostic::info(
                format!("no settings at {}; skipped", source.path.display()),
                at,
            ));
            return report;
        }

        let content = match fs::read_to_string(&source.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("could not read {}: {}", source.path.display(), e);
                report.outcome = Outcome::single(Diagnostic::error(
                    IssueKind::Structural,
                    format!("could not read settings: {}", e),
                    at,
                ));
                return report;
            }
        };
        let settings: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                report.outcome = Outcome::single(Diagnostic::error(
                    IssueKind::Structural,
                    format!("invalid JSON: {}", e),
                    at,
                ));
                return report;
            }
        };

        SourceReport {
            path: Some(source.path.clone()),
            ..self.validate(&settings, &source.label)
        }
    }
}

/// Whether a matcher string fits the accepted grammar.
pub fn matcher_is_well_formed(matcher: &str) -> bool {
    MATCHER_GRAMMAR.is_match(matcher)
}

/// An absent matcher selects every operation and is fine.
fn check_matcher(matcher: Option<&Value>, at: &Location) -> Option<Diagnostic> {
    let at = at.clone().field("matcher");
    match matcher? {
        Value::String(m) if matcher_is_well_formed(m) => None,
        Value::String(m) => Some(Diagnostic::warning(
            IssueKind::Syntax,
            format!("matcher \"{}\" syntax may be incorrect", m),
            at,
        )),
        other => Some(Diagnostic::warning(
            IssueKind::Syntax,
            format!("matcher should be a string, found {}", json_type(other)),
            at,
        )),
    }
}

fn display_number(n: &Number) -> String {
    n.to_string()
}

/// Result of checking every selected source.
#[derive(Debug, Clone, Serialize)]
pub struct HooksRun {
    pub sources: Vec<SourceReport>,
}

impl HooksRun {
    /// Sources that existed and were validated.
    pub fn checked(&self) -> usize {
        self.sources.iter().filter(|s| s.loaded).count()
    }

    pub fn hooks(&self) -> usize {
        self.sources.iter().map(SourceReport::hooks).sum()
    }

    pub fn outcome(&self) -> Outcome {
        self.sources.iter().map(|s| s.outcome.clone()).collect()
    }
}

pub fn run_hooks(config: &Config, resolver: &PathResolver, selection: HookSelection) -> HooksRun {
    let validator = HookValidator::new(&config.hooks, resolver);
    let sources = hook_sources(&config.hooks, resolver, selection)
        .iter()
        .map(|source| {
            tracing::debug!("checking {} hooks at {}", source.label, source.path.display());
            validator.check_source(source)
        })
        .collect();
    HooksRun { sources }
}
