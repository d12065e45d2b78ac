//! Invocation grammar for hook commands.
//!
//! Only two shapes carry a checkable script path:
//!
//! - `<interpreter> [flags] <path> [args]`, e.g. `python3 -u hooks/fmt.py --fix`
//! - `<path> [args]` where the first token is recognisably a script
//!
//! Everything else is reported as unparseable so the caller can say the
//! script was not verified instead of skipping it silently.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const SCRIPT_EXTENSIONS: &[&str] = &[
    ".sh", ".bash", ".zsh", ".py", ".js", ".mjs", ".cjs", ".ts", ".ps1", ".rb", ".pl", ".cmd",
    ".bat",
];

/// Interpreter flags whose argument is inline code rather than a file.
const INLINE_CODE_FLAGS: &[&str] = &["-c", "-e", "-m", "-p", "--eval", "--print", "-Command"];

static ENV_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("assignment pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Invocation {
    InterpreterPrefixed {
        interpreter: String,
        path: String,
        args: Vec<String>,
    },
    BarePath {
        path: String,
    },
    Unparseable {
        reason: String,
    },
}

impl Invocation {
    pub fn script_path(&self) -> Option<&str> {
        match self {
            Self::InterpreterPrefixed { path, .. } | Self::BarePath { path } => Some(path),
            Self::Unparseable { .. } => None,
        }
    }

    fn unparseable(reason: impl Into<String>) -> Self {
        Self::Unparseable {
            reason: reason.into(),
        }
    }
}

/// Split a command line into words.
fn tokenize(command: &str) -> Option<Vec<String>> {
    shlex::split(&protect_separators(command))
}

/// Double every backslash that does not escape whitespace, a quote or `$`,
/// so Windows separators survive POSIX quoting rules. Single-quoted text
/// is left as written.
fn protect_separators(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    let mut chars = command.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\'' | '"', None) => quote = Some(c),
            (_, Some(open)) if c == open => quote = None,
            ('\\', Some('\'')) => {}
            ('\\', _) => match chars.peek() {
                Some(&next) if next.is_whitespace() || matches!(next, '"' | '\'' | '$') => {
                    out.push(c);
                    out.push(next);
                    chars.next();
                    continue;
                }
                _ => out.push('\\'),
            },
            _ => {}
        }
        out.push(c);
    }
    out
}

fn program_name(token: &str) -> String {
    let base = token.rsplit(['/', '\\']).next().unwrap_or(token);
    let base = base.to_ascii_lowercase();
    base.strip_suffix(".exe").map(str::to_string).unwrap_or(base)
}

fn looks_like_script(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    token.contains(['/', '\\'])
        || token.starts_with(['~', '$', '%'])
        || SCRIPT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Classify a hook command against the supported invocation shapes.
pub fn parse_command(command: &str, interpreters: &[String]) -> Invocation {
    if command.trim().is_empty() {
        return Invocation::unparseable("command is empty");
    }
    let Some(tokens) = tokenize(command) else {
        return Invocation::unparseable("unbalanced quotes");
    };

    let mut words = tokens
        .into_iter()
        .skip_while(|t| ENV_ASSIGNMENT.is_match(t))
        .peekable();
    let Some(program) = words.next() else {
        return Invocation::unparseable("command only sets variables");
    };

    let name = program_name(&program);
    if interpreters.iter().any(|i| i.eq_ignore_ascii_case(&name)) {
        if matches!(name.as_str(), "deno" | "bun") && words.peek().map(String::as_str) == Some("run")
        {
            words.next();
        }
        while let Some(flag) = words.next_if(|w| w.starts_with('-')) {
            if INLINE_CODE_FLAGS.iter().any(|f| f.eq_ignore_ascii_case(&flag)) {
                return Invocation::unparseable(format!("{} runs inline code ({})", name, flag));
            }
        }
        return match words.next() {
            Some(path) => Invocation::InterpreterPrefixed {
                interpreter: name,
                path,
                args: words.collect(),
            },
            None => Invocation::unparseable(format!("no script given to {}", name)),
        };
    }

    if looks_like_script(&program) {
        return Invocation::BarePath { path: program };
    }

    Invocation::unparseable(format!(
        "'{}' is neither a known interpreter nor a script path",
        program
    ))
}
