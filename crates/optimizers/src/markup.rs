//! Lightweight markup scanning shared by the optimizers.
//!
//! Nothing here builds a tree. A document is split into three kinds of
//! segments: markup (tags and text), verbatim element bodies and comments.
//! Tag rewriting only ever runs over markup segments, so code inside a
//! `<script>` or a `<code>` sample is never mistaken for tags.

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

/// Elements whose bodies every optimizer copies through unchanged.
pub const VERBATIM_TAGS: [&str; 5] = ["script", "style", "textarea", "pre", "code"];

static START_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:-]*)((?:"[^"]*"|'[^']*'|[^'">])*)>"#)
        .expect("start tag pattern is valid")
});

static END_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</([A-Za-z][A-Za-z0-9:-]*)[\t\n\x0C\r ]+>").expect("end tag pattern is valid")
});

static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([\t\n\x0C\r ]+)([^\t\n\x0C\r "'<>/=]+)(?:([\t\n\x0C\r ]*=[\t\n\x0C\r ]*)("[^"]*"|'[^']*'|[^\t\n\x0C\r "'=<>`]+))?"#,
    )
    .expect("attribute pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'t> {
    Markup(&'t str),
    Verbatim(&'t str),
    Comment(&'t str),
}

/// Finds verbatim element bodies for a fixed set of tag names.
#[derive(Debug, Clone)]
pub(crate) struct Scanner {
    open: Regex,
    closers: Vec<(String, Regex)>,
}

impl Scanner {
    /// Builds a scanner for [`VERBATIM_TAGS`] plus `extra` names, matched
    /// case-insensitively.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, regex::Error> {
        let mut names: Vec<String> = VERBATIM_TAGS.iter().map(|name| name.to_string()).collect();
        for name in extra {
            let lowered = name.as_ref().to_ascii_lowercase();
            if !lowered.is_empty() && !names.contains(&lowered) {
                names.push(lowered);
            }
        }

        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let open = RegexBuilder::new(&format!(
            r#"<({alternation})(?:[\t\n\x0C\r /](?:"[^"]*"|'[^']*'|[^'">])*)?>"#
        ))
        .case_insensitive(true)
        .build()?;
        let closers = names
            .into_iter()
            .map(|name| {
                RegexBuilder::new(&format!(r"</{}[\t\n\x0C\r ]*>", regex::escape(&name)))
                    .case_insensitive(true)
                    .build()
                    .map(|closer| (name, closer))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { open, closers })
    }

    /// Splits `text` into markup, verbatim bodies and comments, in order.
    ///
    /// The opening and closing tags of verbatim elements belong to the markup
    /// around them; only the body is verbatim. An unclosed comment or verbatim
    /// element runs to the end of the document.
    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut out = Vec::new();
        let mut cursor = 0;
        let mut search = 0;
        loop {
            let comment = text[search..].find("<!--").map(|offset| search + offset);
            let raw = self.open.captures_at(text, search);
            let raw_start = raw.as_ref().and_then(|caps| caps.get(0)).map(|m| m.start());

            match (comment, raw_start) {
                (Some(comment_start), raw_start)
                    if raw_start.map_or(true, |start| comment_start < start) =>
                {
                    push_markup(&mut out, &text[cursor..comment_start]);
                    let end = text[comment_start + 4..]
                        .find("-->")
                        .map_or(text.len(), |offset| comment_start + 4 + offset + 3);
                    out.push(Segment::Comment(&text[comment_start..end]));
                    cursor = end;
                    search = end;
                }
                (_, Some(_)) => {
                    let Some(caps) = raw else { break };
                    let (Some(opening), Some(name)) = (caps.get(0), caps.get(1)) else {
                        break;
                    };
                    push_markup(&mut out, &text[cursor..opening.end()]);
                    let body_end = self
                        .closers
                        .iter()
                        .find(|(closer_name, _)| closer_name.eq_ignore_ascii_case(name.as_str()))
                        .and_then(|(_, closer)| closer.find_at(text, opening.end()))
                        .map_or(text.len(), |close| close.start());
                    if body_end > opening.end() {
                        out.push(Segment::Verbatim(&text[opening.end()..body_end]));
                    }
                    cursor = body_end;
                    search = body_end;
                }
                _ => break,
            }
        }
        push_markup(&mut out, &text[cursor..]);
        out
    }

    /// Applies `rewrite` to every markup segment and reassembles the document.
    pub fn rewrite_markup(&self, text: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in self.segments(text) {
            match segment {
                Segment::Markup(markup) => out.push_str(&rewrite(markup)),
                Segment::Verbatim(raw) | Segment::Comment(raw) => out.push_str(raw),
            }
        }
        out
    }

    /// Rewrites every start tag in markup segments. `rewrite` returns `None`
    /// to keep a tag unchanged.
    pub fn rewrite_start_tags(
        &self,
        text: &str,
        mut rewrite: impl FnMut(StartTag<'_>) -> Option<String>,
    ) -> String {
        self.rewrite_markup(text, |markup| {
            START_TAG_RE
                .replace_all(markup, |caps: &Captures<'_>| {
                    let tag = StartTag {
                        name: caps.get(1).map_or("", |m| m.as_str()),
                        attributes: caps.get(2).map_or("", |m| m.as_str()),
                    };
                    rewrite(tag).unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned()
        })
    }

    /// Rewrites attributes of every start tag in markup segments. `rewrite`
    /// receives the tag name and one attribute at a time, with the same
    /// contract as [`rewrite_attributes`].
    pub fn rewrite_tag_attributes(
        &self,
        text: &str,
        mut rewrite: impl FnMut(&str, &Attribute<'_>) -> Option<String>,
    ) -> String {
        self.rewrite_start_tags(text, |tag| {
            let attributes = rewrite_attributes(tag.attributes, |attribute| rewrite(tag.name, attribute));
            (attributes != tag.attributes).then(|| format!("<{}{}>", tag.name, attributes))
        })
    }

    /// Removes whitespace before the `>` of end tags in markup segments.
    pub fn tidy_end_tags(&self, text: &str) -> String {
        self.rewrite_markup(text, |markup| END_TAG_RE.replace_all(markup, "</$1>").into_owned())
    }
}

fn push_markup<'t>(out: &mut Vec<Segment<'t>>, markup: &'t str) {
    if !markup.is_empty() {
        out.push(Segment::Markup(markup));
    }
}

/// A start tag split into its name and everything up to the closing `>`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StartTag<'t> {
    pub name: &'t str,
    /// Attribute text including leading whitespace and any trailing `/`.
    pub attributes: &'t str,
}

/// One attribute as written in the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attribute<'t> {
    /// Byte offset of `source` within the attribute text.
    pub start: usize,
    /// The attribute exactly as written, leading whitespace included.
    pub source: &'t str,
    pub leading: &'t str,
    pub name: &'t str,
    pub equals: Option<&'t str>,
    pub raw_value: Option<&'t str>,
    /// The attribute is immediately followed by `/` (as in `a="b"/>`).
    pub followed_by_slash: bool,
}

impl<'t> Attribute<'t> {
    pub fn quote(&self) -> Option<char> {
        self.raw_value
            .and_then(|raw| raw.chars().next())
            .filter(|ch| *ch == '"' || *ch == '\'')
    }

    /// The value without its quotes.
    pub fn value(&self) -> Option<&'t str> {
        let raw = self.raw_value?;
        Some(match self.quote() {
            Some(_) => &raw[1..raw.len() - 1],
            None => raw,
        })
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The attribute with only its name, as for boolean attributes.
    pub fn without_value(&self) -> String {
        format!("{}{}", self.leading, self.name)
    }

    /// The attribute with `value` in place of its current value, keeping the
    /// original quote style where it is still valid.
    pub fn with_value(&self, value: &str) -> String {
        let equals = self.equals.unwrap_or("=");
        let quoted = match self.quote() {
            Some('\'') if !value.contains('\'') => format!("'{value}'"),
            Some(_) => format!("\"{}\"", value.replace('"', "&quot;")),
            None if is_unquoted_safe(value) && !self.followed_by_slash => value.to_string(),
            None => format!("\"{}\"", value.replace('"', "&quot;")),
        };
        format!("{}{}{}{}", self.leading, self.name, equals, quoted)
    }
}

/// True if `value` can be written as an unquoted attribute value.
pub(crate) fn is_unquoted_safe(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|ch| matches!(ch, '\t' | '\n' | '\x0C' | '\r' | ' ' | '"' | '\'' | '=' | '<' | '>' | '`'))
}

/// Rewrites each attribute of a start tag. `rewrite` returns `None` to keep
/// the attribute as written; `Some(String::new())` removes it. Attribute text
/// that does not parse completely is returned unchanged.
pub(crate) fn rewrite_attributes(
    attributes: &str,
    mut rewrite: impl FnMut(&Attribute<'_>) -> Option<String>,
) -> String {
    let Some((parsed, _)) = parse_attributes(attributes) else {
        return attributes.to_string();
    };
    let mut out = String::with_capacity(attributes.len());
    let mut cursor = 0;
    for attribute in &parsed {
        out.push_str(&attributes[cursor..attribute.start]);
        match rewrite(attribute) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(attribute.source),
        }
        cursor = attribute.start + attribute.source.len();
    }
    out.push_str(&attributes[cursor..]);
    out
}

/// Parses the attribute text of a start tag completely, or returns `None` if
/// any part of it is not a recognizable attribute. The flag reports a
/// trailing self-closing `/`. A slash directly after an unquoted value is
/// part of that value.
pub(crate) fn parse_attributes(attributes: &str) -> Option<(Vec<Attribute<'_>>, bool)> {
    let mut parsed = Vec::new();
    let mut expected_start = 0;
    for caps in ATTRIBUTE_RE.captures_iter(attributes) {
        let whole = caps.get(0)?;
        if whole.start() != expected_start {
            return None;
        }
        expected_start = whole.end();
        parsed.push(Attribute {
            start: whole.start(),
            source: whole.as_str(),
            leading: caps.get(1).map_or("", |m| m.as_str()),
            name: caps.get(2)?.as_str(),
            equals: caps.get(3).map(|m| m.as_str()),
            raw_value: caps.get(4).map(|m| m.as_str()),
            followed_by_slash: attributes[whole.end()..].starts_with('/'),
        });
    }
    match attributes[expected_start..].trim_matches(['\t', '\n', '\x0C', '\r', ' ']) {
        "" => Some((parsed, false)),
        "/" => Some((parsed, true)),
        _ => None,
    }
}
