//! Script path resolution for hook commands.
//!
//! A path taken from a hook command goes through three rewrites before it
//! is checked on disk: a leading `~` becomes the home directory, `$VAR`,
//! `${VAR}` and `%VAR%` placeholders are substituted, and separators are
//! normalized for the running platform. Relative results are joined onto
//! the project root and cleaned lexically.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable hosts export to hook commands for the project root.
pub const PROJECT_DIR_VAR: &str = "CLAUDE_PROJECT_DIR";

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)|%([A-Za-z_][A-Za-z0-9_]*)%")
        .expect("variable pattern is valid")
});

#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
    home_dir: Option<PathBuf>,
    vars: BTreeMap<String, String>,
}

impl PathResolver {
    /// A resolver with no home directory and no variables.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            home_dir: None,
            vars: BTreeMap::new(),
        }
    }

    /// A resolver backed by the process environment.
    pub fn from_env(base_dir: impl Into<PathBuf>) -> Self {
        let resolver = Self::from_vars(base_dir, std::env::vars());
        match dirs::home_dir() {
            Some(home) => resolver.with_home(home),
            None => resolver,
        }
    }

    /// A resolver over an explicit variable table.
    ///
    /// The project-dir variable falls back to `base_dir` when unset.
    pub fn from_vars<I>(base_dir: impl Into<PathBuf>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let base_dir = base_dir.into();
        let mut vars: BTreeMap<String, String> = vars.into_iter().collect();
        vars.entry(PROJECT_DIR_VAR.to_string())
            .or_insert_with(|| base_dir.to_string_lossy().into_owned());
        Self {
            base_dir,
            home_dir: None,
            vars,
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    pub fn expand_home(&self, raw: &str) -> String {
        let Some(home) = &self.home_dir else {
            return raw.to_string();
        };
        if raw == "~" {
            return home.to_string_lossy().into_owned();
        }
        match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
            Some(rest) => format!("{}{}{}", home.to_string_lossy(), MAIN_SEPARATOR, rest),
            None => raw.to_string(),
        }
    }

    /// Substitute `$VAR`, `${VAR}` and `%VAR%`. Unknown names stay as written.
    pub fn expand_vars(&self, raw: &str) -> String {
        VAR_PATTERN
            .replace_all(raw, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                self.lookup(name)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned().or_else(|| {
            // Windows variable names are case-insensitive.
            self.vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        })
    }

    /// Turn a raw script path from a command into an absolute path.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let expanded = self.expand_vars(&self.expand_home(raw));
        let path = PathBuf::from(normalize_separators(&expanded));
        let absolute = if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        };
        clean(&absolute)
    }
}

/// Rewrite both separator styles to the running platform's separator.
pub fn normalize_separators(raw: &str) -> String {
    if MAIN_SEPARATOR == '\\' {
        raw.replace('/', "\\")
    } else {
        raw.replace('\\', "/")
    }
}

/// Drop `.` components and fold `..` without touching the filesystem.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/work/project")
            .with_home("/home/dev")
            .with_var("HOOKS", "/opt/hooks")
            .with_var("CLAUDE_PROJECT_DIR", "/work/project")
    }

    #[cfg(unix)]
    #[test]
    fn expands_home_shorthand() {
        let r = resolver();
        assert_eq!(
            r.resolve("~/.claude/scripts/check.py"),
            PathBuf::from("/home/dev/.claude/scripts/check.py")
        );
        assert_eq!(r.expand_home("~"), "/home/dev");
        assert_eq!(r.expand_home("a/~/b"), "a/~/b");
    }

    #[test]
    fn substitutes_posix_and_windows_placeholders() {
        let r = resolver();
        assert_eq!(r.expand_vars("$HOOKS/a.sh"), "/opt/hooks/a.sh");
        assert_eq!(r.expand_vars("${HOOKS}/a.sh"), "/opt/hooks/a.sh");
        assert_eq!(r.expand_vars("%HOOKS%/a.sh"), "/opt/hooks/a.sh");
        assert_eq!(r.expand_vars("%hooks%/a.sh"), "/opt/hooks/a.sh");
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let r = resolver();
        assert_eq!(r.expand_vars("$NOPE/a.sh"), "$NOPE/a.sh");
        assert_eq!(r.expand_vars("%NOPE%\\a.sh"), "%NOPE%\\a.sh");
    }

    #[cfg(unix)]
    #[test]
    fn relative_paths_join_the_base_and_are_cleaned() {
        let r = resolver();
        assert_eq!(
            r.resolve(".claude/scripts/../scripts/./fmt.py"),
            PathBuf::from("/work/project/.claude/scripts/fmt.py")
        );
        assert_eq!(
            r.resolve(".claude\\scripts\\fmt.py"),
            PathBuf::from("/work/project/.claude/scripts/fmt.py")
        );
        assert_eq!(
            r.resolve("$CLAUDE_PROJECT_DIR/.claude/hooks/a.sh"),
            PathBuf::from("/work/project/.claude/hooks/a.sh")
        );
    }

    #[test]
    fn project_dir_falls_back_to_base() {
        let r = PathResolver::from_vars("/some/root", [("HOOKS".to_string(), "/opt".to_string())]);
        assert_eq!(r.lookup(PROJECT_DIR_VAR).as_deref(), Some("/some/root"));

        let r = PathResolver::from_vars(
            "/some/root",
            [(PROJECT_DIR_VAR.to_string(), "/elsewhere".to_string())],
        );
        assert_eq!(r.lookup(PROJECT_DIR_VAR).as_deref(), Some("/elsewhere"));
    }
}
