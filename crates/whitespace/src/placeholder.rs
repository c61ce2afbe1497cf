//! Placeholder grammar shared by every extraction stage.
//!
//! A placeholder is an opaque token of the form
//! `<MARKER>_<KIND>_<INDEX>___` that stands in for a region of markup while
//! later stages rewrite the text around it. Tokens contain no whitespace and
//! no `<`, so every text-level stage treats them as a single word.
//!
//! ```rust
//! use whitespace::placeholder::{PlaceholderKind, PlaceholderTable};
//!
//! let mut table = PlaceholderTable::new();
//! let token = table.push(PlaceholderKind::Preserve, "<pre> a </pre>".to_string());
//! let text = format!("<div>{token}</div>");
//! assert_eq!(table.restore(&text), "<div><pre> a </pre></div>");
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker prefix of every placeholder token.
pub const MARKER: &str = "HTMLPOST7F3A";

/// Suffix terminating the index digits of every placeholder token.
pub const SUFFIX: &str = "___";

/// Restoration never follows placeholder chains deeper than this.
const MAX_RESTORE_DEPTH: usize = 512;

/// Characters of context kept on each side of a reported placeholder.
const CONTEXT_RADIUS: usize = 40;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"HTMLPOST7F3A_(PRESERVE|INLINE|EXCLUDE)_([0-9]+)___")
        .expect("placeholder grammar is a valid pattern")
});

/// Which stage produced a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// Verbatim preserve element (`pre`, `code`, `script`, ...).
    Preserve,
    /// Whitespace-normalized inline element.
    Inline,
    /// Caller-excluded region, owned by the pipeline runner.
    Exclude,
}

impl PlaceholderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderKind::Preserve => "PRESERVE",
            PlaceholderKind::Inline => "INLINE",
            PlaceholderKind::Exclude => "EXCLUDE",
        }
    }

    fn parse(label: &str) -> Option<Self> {
        match label {
            "PRESERVE" => Some(PlaceholderKind::Preserve),
            "INLINE" => Some(PlaceholderKind::Inline),
            "EXCLUDE" => Some(PlaceholderKind::Exclude),
            _ => None,
        }
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the token for `kind` and `index`.
pub fn placeholder_token(kind: PlaceholderKind, index: usize) -> String {
    format!("{MARKER}_{}_{index}{SUFFIX}", kind.as_str())
}

/// One placeholder-shaped token found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch<'t> {
    pub kind: PlaceholderKind,
    /// `None` when the digits do not fit a `usize`.
    pub index: Option<usize>,
    pub start: usize,
    pub end: usize,
    pub token: &'t str,
}

/// Iterates over every placeholder-shaped token in `text`, left to right.
pub fn find_placeholders(text: &str) -> impl Iterator<Item = PlaceholderMatch<'_>> + '_ {
    PLACEHOLDER_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let kind = PlaceholderKind::parse(caps.get(1)?.as_str())?;
        let index = caps.get(2)?.as_str().parse::<usize>().ok();
        Some(PlaceholderMatch {
            kind,
            index,
            start: whole.start(),
            end: whole.end(),
            token: whole.as_str(),
        })
    })
}

/// Returns true if `text` holds a token of any of `kinds`.
pub fn contains_placeholder(text: &str, kinds: &[PlaceholderKind]) -> bool {
    find_placeholders(text).any(|m| kinds.contains(&m.kind))
}

/// Returns the text surrounding `start..end`, widened to char boundaries.
pub fn context_snippet(text: &str, start: usize, end: usize) -> &str {
    let mut from = start.saturating_sub(CONTEXT_RADIUS);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = end.saturating_add(CONTEXT_RADIUS).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    &text[from..to]
}

/// Index-addressed records of extracted content, one list per kind.
///
/// A table lives for one document-processing call. Indices are handed out in
/// push order, so a token always refers to content recorded before it.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTable {
    preserve: Vec<String>,
    inline: Vec<String>,
    exclude: Vec<String>,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `content` and returns the token standing in for it.
    pub fn push(&mut self, kind: PlaceholderKind, content: String) -> String {
        let records = self.records_mut(kind);
        let index = records.len();
        records.push(content);
        placeholder_token(kind, index)
    }

    pub fn get(&self, kind: PlaceholderKind, index: usize) -> Option<&str> {
        self.records(kind).get(index).map(String::as_str)
    }

    pub fn len(&self, kind: PlaceholderKind) -> usize {
        self.records(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.preserve.is_empty() && self.inline.is_empty() && self.exclude.is_empty()
    }

    /// Replaces every known token in `text` with its recorded content in one
    /// linear scan. Inline records may themselves hold tokens and are expanded
    /// recursively; preserve and exclude records are emitted verbatim.
    /// Unknown kinds and out-of-range indices are copied through unchanged.
    pub fn restore(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        self.restore_into(text, &mut out, 0);
        out
    }

    fn restore_into(&self, text: &str, out: &mut String, depth: usize) {
        let mut cursor = 0;
        for found in find_placeholders(text) {
            let Some(content) = found.index.and_then(|index| self.get(found.kind, index)) else {
                continue;
            };
            out.push_str(&text[cursor..found.start]);
            if found.kind == PlaceholderKind::Inline && depth < MAX_RESTORE_DEPTH {
                self.restore_into(content, out, depth + 1);
            } else {
                out.push_str(content);
            }
            cursor = found.end;
        }
        out.push_str(&text[cursor..]);
    }

    fn records(&self, kind: PlaceholderKind) -> &Vec<String> {
        match kind {
            PlaceholderKind::Preserve => &self.preserve,
            PlaceholderKind::Inline => &self.inline,
            PlaceholderKind::Exclude => &self.exclude,
        }
    }

    fn records_mut(&mut self, kind: PlaceholderKind) -> &mut Vec<String> {
        match kind {
            PlaceholderKind::Preserve => &mut self.preserve,
            PlaceholderKind::Inline => &mut self.inline,
            PlaceholderKind::Exclude => &mut self.exclude,
        }
    }
}
