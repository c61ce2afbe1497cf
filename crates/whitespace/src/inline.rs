//! Inline element normalization.
//!
//! Whitespace around inline elements decides whether two words render joined
//! or separated, so an inline element and the whitespace touching it are
//! captured together. The element's interior is collapsed and stored behind
//! an INLINE placeholder; the surrounding whitespace is re-emitted as at most
//! one space on each side.
//!
//! Each pass pairs every opening inline tag with an immediately following
//! close tag of the same name (no other inline tag between them), which is
//! exactly the set of innermost elements. Replacing them exposes their
//! parents to the next pass, so passes repeat until nothing changes.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::collapse::{collapse_inline_interior, is_html_whitespace};
use crate::placeholder::{PlaceholderKind, PlaceholderTable};

/// Elements whose surrounding whitespace affects rendered word spacing.
pub const INLINE_TAGS: [&str; 17] = [
    "a", "span", "em", "strong", "b", "i", "u", "s", "small", "mark", "sub", "sup", "time", "cite",
    "abbr", "label", "svg",
];

/// Upper bound on fixed-point passes. Every productive pass removes at least
/// one literal element, so only pathological nesting reaches it.
pub const MAX_INLINE_PASSES: usize = 256;

static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<(/?)(a|span|em|strong|b|i|u|s|small|mark|sub|sup|time|cite|abbr|label|svg)(?:[\t\n\x0C\r /](?:"[^"]*"|'[^']*'|[^'">])*)?>"#,
    )
    .expect("inline tag pattern is valid")
});

#[derive(Debug)]
struct TagEvent {
    start: usize,
    end: usize,
    closing: bool,
    name: String,
}

/// Replaces inline elements with INLINE placeholders until a fixed point.
pub fn normalize_inline(text: &str, table: &mut PlaceholderTable) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_INLINE_PASSES {
        match normalize_pass(&current, table) {
            Some(next) => current = next,
            None => return current,
        }
    }
    if normalize_pass(&current, &mut PlaceholderTable::new()).is_some() {
        warn!(
            max_passes = MAX_INLINE_PASSES,
            "inline normalization stopped at pass limit"
        );
    }
    current
}

/// Runs one pass. Returns `None` when no element was replaced.
fn normalize_pass(text: &str, table: &mut PlaceholderTable) -> Option<String> {
    let events: Vec<TagEvent> = INLINE_TAG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(TagEvent {
                start: whole.start(),
                end: whole.end(),
                closing: !caps.get(1)?.as_str().is_empty(),
                name: caps.get(2)?.as_str().to_ascii_lowercase(),
            })
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut replaced = false;
    let mut i = 0;
    while i + 1 < events.len() {
        let (open, close) = (&events[i], &events[i + 1]);
        if open.closing || !close.closing || open.name != close.name {
            i += 1;
            continue;
        }

        let lead_start = skip_whitespace_back(text, open.start, cursor);
        let trail_end = skip_whitespace_forward(text, close.end);

        let mut element = String::with_capacity(close.end - open.start);
        element.push_str(&text[open.start..open.end]);
        element.push_str(&collapse_inline_interior(&text[open.end..close.start]));
        element.push_str(&text[close.start..close.end]);

        out.push_str(&text[cursor..lead_start]);
        if lead_start < open.start {
            out.push(' ');
        }
        out.push_str(&table.push(PlaceholderKind::Inline, element));
        if trail_end > close.end {
            out.push(' ');
        }

        cursor = trail_end;
        replaced = true;
        i += 2;
    }

    if !replaced {
        return None;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Walks back over whitespace from `from`, never past `floor`.
fn skip_whitespace_back(text: &str, from: usize, floor: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos > floor && is_html_whitespace(char::from(bytes[pos - 1])) {
        pos -= 1;
    }
    pos
}

fn skip_whitespace_forward(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos < bytes.len() && is_html_whitespace(char::from(bytes[pos])) {
        pos += 1;
    }
    pos
}
