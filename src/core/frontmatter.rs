//! Header block parser for descriptor documents.
//!
//! A descriptor opens with a `---` line, carries `key: value` lines, and
//! closes with another `---` line. Only a small subset of YAML is accepted:
//!
//! - `key: value` raw scalars and `key: "quoted"` / `key: 'quoted'` scalars
//! - `key: [a, b, c]` inline lists
//! - `key:` followed by `  - item` block lists
//! - `key: |` or `key: >` followed by indented text, joined with spaces
//!
//! The scanner is a line-driven state machine. Each line is classified once
//! and the pair `(state, line)` picks the next state in [`transition`].
//! Lines that fit no rule are skipped without error.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// True for a blank scalar or a list with no items.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s.as_str()),
            Self::List(_) => None,
        }
    }

    /// Items of a list; a scalar counts as a single item.
    pub fn items(&self) -> Vec<&str> {
        match self {
            Self::Scalar(s) => vec![s.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
        }
    }
}

/// Parsed header fields. Field order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    fields: BTreeMap<String, FieldValue>,
}

impl Descriptor {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Render the fields back into a delimited header block.
    ///
    /// Output stays inside the accepted subset: scalars are quoted when a raw
    /// form would be read differently, lists use block form.
    pub fn to_header(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.fields {
            match value {
                FieldValue::Scalar(s) => {
                    out.push_str(&format!("{}: {}\n", key, render_scalar(s)));
                }
                FieldValue::List(items) if items.is_empty() => {
                    out.push_str(&format!("{}: []\n", key));
                }
                FieldValue::List(items) => {
                    out.push_str(&format!("{}:\n", key));
                    for item in items {
                        out.push_str(&format!("  - {}\n", render_item(item)));
                    }
                }
            }
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

/// A descriptor document split into header fields and prose body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub header: Descriptor,
    pub body: String,
}

/// Why a document has no usable header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// The first line is not the delimiter.
    MissingOpening,
    /// The opening delimiter is never closed.
    Unterminated,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOpening => {
                write!(f, "missing header: first line must be '{}'", DELIMITER)
            }
            Self::Unterminated => {
                write!(f, "unterminated header: no closing '{}' line", DELIMITER)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseState {
    ExpectKey,
    InArrayContinuation(String),
    InStringContinuation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    /// Unindented `key: value`.
    Key { key: &'a str, value: &'a str },
    /// `  - item` (or `- item` at column zero).
    ListItem(&'a str),
    /// Indented text that is not a list item.
    Indented(&'a str),
    Blank,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueShape {
    InlineList(Vec<String>),
    BlockList,
    BlockString,
    Scalar(String),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    let indented = line.starts_with(char::is_whitespace);
    if trimmed == "-" || trimmed.starts_with("- ") {
        return Line::ListItem(trimmed[1..].trim());
    }
    if indented {
        return Line::Indented(trimmed);
    }
    if trimmed.starts_with('#') {
        return Line::Other;
    }
    match line.split_once(':') {
        Some((key, value)) if is_key(key) => Line::Key {
            key: key.trim_end(),
            value: value.trim(),
        },
        _ => Line::Other,
    }
}

fn is_key(raw: &str) -> bool {
    let key = raw.trim_end();
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

fn classify_value(raw: &str) -> ValueShape {
    if raw.is_empty() {
        return ValueShape::BlockList;
    }
    if matches!(raw, "|" | ">" | "|-" | ">-" | "|+" | ">+") {
        return ValueShape::BlockString;
    }
    if raw.starts_with('[') && raw.ends_with(']') {
        let inner = &raw[1..raw.len() - 1];
        return ValueShape::InlineList(
            split_flow_sequence(inner)
                .into_iter()
                .map(unquote)
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }
    ValueShape::Scalar(unquote(raw))
}

/// Split the inside of `[...]` on commas outside quotes and parentheses.
///
/// `Bash(git add, git commit), Read` yields two items, not three.
fn split_flow_sequence(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        items.push(last);
    }
    items
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 {
        if raw.starts_with('"') && raw.ends_with('"') {
            return raw[1..raw.len() - 1]
                .replace("\\\"", "\"")
                .replace("\\\\", "\\");
        }
        if raw.starts_with('\'') && raw.ends_with('\'') {
            return raw[1..raw.len() - 1].replace("''", "'");
        }
    }
    raw.to_string()
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value.starts_with(['[', '"', '\'', '|', '>', '#'])
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn render_scalar(value: &str) -> String {
    if needs_quotes(value) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn render_item(value: &str) -> String {
    if value.starts_with(['"', '\'']) || value.starts_with("- ") {
        quote(value)
    } else {
        value.to_string()
    }
}

fn start_key(key: &str, value: &str, header: &mut Descriptor) -> ParseState {
    match classify_value(value) {
        ValueShape::InlineList(items) => {
            header.insert(key, FieldValue::List(items));
            ParseState::ExpectKey
        }
        ValueShape::BlockList => {
            header.insert(key, FieldValue::List(Vec::new()));
            ParseState::InArrayContinuation(key.to_string())
        }
        ValueShape::BlockString => {
            header.insert(key, FieldValue::Scalar(String::new()));
            ParseState::InStringContinuation(key.to_string())
        }
        ValueShape::Scalar(s) => {
            header.insert(key, FieldValue::Scalar(s));
            ParseState::ExpectKey
        }
    }
}

fn transition(state: ParseState, line: Line<'_>, header: &mut Descriptor) -> ParseState {
    match (state, line) {
        (_, Line::Key { key, value }) => start_key(key, value, header),
        (ParseState::InArrayContinuation(key), Line::ListItem(item)) => {
            let item = unquote(item);
            if let Some(FieldValue::List(items)) = header.fields.get_mut(&key) {
                if !item.is_empty() {
                    items.push(item);
                }
            }
            ParseState::InArrayContinuation(key)
        }
        (ParseState::InArrayContinuation(_), _) => ParseState::ExpectKey,
        (ParseState::InStringContinuation(key), Line::Indented(text)) => {
            if let Some(FieldValue::Scalar(acc)) = header.fields.get_mut(&key) {
                if !acc.is_empty() {
                    acc.push(' ');
                }
                acc.push_str(text);
            }
            ParseState::InStringContinuation(key)
        }
        (ParseState::InStringContinuation(key), Line::Blank) => {
            ParseState::InStringContinuation(key)
        }
        (ParseState::InStringContinuation(_), _) => ParseState::ExpectKey,
        (ParseState::ExpectKey, _) => ParseState::ExpectKey,
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Split a document into its header fields and body.
pub fn parse_document(text: &str) -> Result<Document, HeaderError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let first = lines.next().ok_or(HeaderError::MissingOpening)?;
    if !is_delimiter(first) {
        return Err(HeaderError::MissingOpening);
    }
    let mut offset = first.len();

    let mut header = Descriptor::default();
    let mut state = ParseState::ExpectKey;
    for raw in lines {
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        if is_delimiter(line) {
            return Ok(Document {
                header,
                body: text[offset..].to_string(),
            });
        }
        state = transition(state, classify(line), &mut header);
    }
    Err(HeaderError::Unterminated)
}

/// Parse only the header fields of a document.
pub fn parse_header(text: &str) -> Result<Descriptor, HeaderError> {
    parse_document(text).map(|doc| doc.header)
}
