//! Configuration for the validators.
//!
//! Loaded from `agentlint.toml` at the project root, or from an explicit
//! `--config` path. Every field has a default, so a missing file is the
//! common case rather than an error.

use crate::core::error::AgentlintError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "agentlint.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub agents: AgentsConfig,
    pub manifest: ManifestConfig,
    pub hooks: HooksConfig,
}

/// Descriptor directory and schema rules.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub dir: String,
    pub suffix: String,
    pub required_fields: Vec<String>,
    pub models: Vec<String>,
    pub min_description_chars: usize,
    pub min_body_chars: usize,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            dir: "agents".to_string(),
            suffix: ".md".to_string(),
            required_fields: ["name", "description", "tools"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            models: ["sonnet", "opus", "haiku", "inherit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_description_chars: 20,
            min_body_chars: 50,
        }
    }
}

/// Where the declared descriptor inventory lives.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// JSON document holding the list, relative to the project root.
    pub path: String,
    /// Top-level key of the list inside that document.
    pub key: String,
    /// Directory entries resolve against, relative to the project root.
    pub root: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: ".claude-plugin/plugin.json".to_string(),
            key: "agents".to_string(),
            root: ".".to_string(),
        }
    }
}

/// Hook sources, grammar allow-lists and timeout bounds (seconds).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HooksConfig {
    pub global: String,
    pub project: String,
    pub min_timeout: u64,
    pub max_timeout: u64,
    pub default_timeout: u64,
    pub lifecycles: Vec<String>,
    pub action_types: Vec<String>,
    pub interpreters: Vec<String>,
    pub recommended_timeouts: BTreeMap<String, u64>,
}

pub const LIFECYCLE_EVENTS: &[&str] = &[
    "PreToolUse",
    "PostToolUse",
    "UserPromptSubmit",
    "Notification",
    "Stop",
    "SubagentStop",
    "PreCompact",
    "SessionStart",
    "SessionEnd",
];

const RECOMMENDED_TIMEOUTS: &[(&str, u64)] = &[
    ("PreToolUse", 30),
    ("PostToolUse", 60),
    ("UserPromptSubmit", 30),
    ("Notification", 30),
    ("Stop", 60),
    ("SubagentStop", 60),
    ("PreCompact", 60),
    ("SessionStart", 60),
    ("SessionEnd", 60),
];

const INTERPRETERS: &[&str] = &[
    "python",
    "python3",
    "py",
    "node",
    "bash",
    "sh",
    "zsh",
    "bun",
    "deno",
    "ruby",
    "perl",
    "pwsh",
    "powershell",
];

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            global: "~/.claude/settings.json".to_string(),
            project: ".claude/settings.json".to_string(),
            min_timeout: 1,
            max_timeout: 600,
            default_timeout: 60,
            lifecycles: LIFECYCLE_EVENTS.iter().map(|s| s.to_string()).collect(),
            action_types: vec!["command".to_string()],
            interpreters: INTERPRETERS.iter().map(|s| s.to_string()).collect(),
            recommended_timeouts: RECOMMENDED_TIMEOUTS
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

impl HooksConfig {
    pub fn recommended_timeout(&self, lifecycle: &str) -> Option<u64> {
        self.recommended_timeouts.get(lifecycle).copied()
    }

    pub fn is_lifecycle(&self, name: &str) -> bool {
        self.lifecycles.iter().any(|l| l == name)
    }

    pub fn is_action_type(&self, name: &str) -> bool {
        self.action_types.iter().any(|t| t == name)
    }
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `<root>/agentlint.toml` is read
/// when present and defaults apply otherwise.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, AgentlintError> {
    let path = match explicit {
        Some(p) => {
            let p = if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            };
            if !p.is_file() {
                return Err(AgentlintError::ConfigError(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => {
            let p = root.join(CONFIG_FILE);
            if !p.is_file() {
                tracing::debug!("no {} at {}, using defaults", CONFIG_FILE, root.display());
                return Ok(Config::default());
            }
            p
        }
    };

    let content = fs::read_to_string(&path).map_err(AgentlintError::IoError)?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| AgentlintError::ConfigError(format!("{}: {}", path.display(), e)))?;

    if config.hooks.min_timeout > config.hooks.max_timeout {
        return Err(AgentlintError::ConfigError(format!(
            "hooks.min_timeout ({}) is greater than hooks.max_timeout ({})",
            config.hooks.min_timeout, config.hooks.max_timeout
        )));
    }
    tracing::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

pub fn render_config(config: &Config) -> Result<String, AgentlintError> {
    toml::to_string_pretty(config).map_err(|e| AgentlintError::ConfigError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hooks.max_timeout, 600);
        assert_eq!(config.hooks.recommended_timeout("PreToolUse"), Some(30));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[agents]\ndir = \"subagents\"\n\n[hooks]\nmax_timeout = 300\n",
        )
        .unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.agents.dir, "subagents");
        assert_eq!(config.agents.suffix, ".md");
        assert_eq!(config.hooks.max_timeout, 300);
        assert_eq!(config.hooks.min_timeout, 1);
    }

    #[test]
    fn inverted_timeout_bounds_are_rejected() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[hooks]\nmin_timeout = 10\nmax_timeout = 5\n",
        )
        .unwrap();
        let err = load_config(tmp.path(), None).unwrap_err();
        assert!(matches!(err, AgentlintError::ConfigError(_)));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = load_config(tmp.path(), Some(Path::new("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn rendered_config_parses_back() {
        let rendered = render_config(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
