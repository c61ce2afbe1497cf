//! Block text collapsing.
//!
//! After preserve and inline regions have been replaced by placeholders, the
//! remaining text is a flat alternation of tag markup and prose. Prose is
//! collapsed to single spaces and trimmed; markup is copied through as-is.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Any tag-like markup. Quoted attribute values may contain `>`. A `<` not
/// followed by a name, `/`, `!` or `?` is prose.
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<[A-Za-z/!?](?:"[^"]*"|'[^']*'|[^'">])*>"#).expect("markup pattern is valid")
});

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\x0C\r ]+").expect("whitespace pattern is valid"));

/// HTML inter-element whitespace. Non-breaking spaces are content, not layout.
pub(crate) fn is_html_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

pub(crate) fn trim_html_whitespace(text: &str) -> &str {
    text.trim_matches(is_html_whitespace)
}

/// Replaces every run of HTML whitespace with a single space.
pub fn collapse_runs(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN_RE.replace_all(text, " ")
}

/// Collapses and trims every text segment between tags, then trims the result.
///
/// ```rust
/// use whitespace::collapse_block_text;
///
/// assert_eq!(collapse_block_text("<div>   a    b   </div>"), "<div>a b</div>");
/// ```
pub fn collapse_block_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for_each_segment(text, |segment, is_markup| {
        if is_markup {
            out.push_str(segment);
        } else {
            out.push_str(trim_html_whitespace(&collapse_runs(segment)));
        }
    });
    trim_html_whitespace(&out).to_string()
}

/// Collapses the interior of an inline element: runs become single spaces but
/// segments keep their edges, so spacing between words and nested tags
/// survives. Only the interior as a whole is trimmed.
pub(crate) fn collapse_inline_interior(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for_each_segment(text, |segment, is_markup| {
        if is_markup {
            out.push_str(segment);
        } else {
            out.push_str(&collapse_runs(segment));
        }
    });
    trim_html_whitespace(&out).to_string()
}

fn for_each_segment<'t>(text: &'t str, mut emit: impl FnMut(&'t str, bool)) {
    let mut last = 0;
    for markup in MARKUP_RE.find_iter(text) {
        if markup.start() > last {
            emit(&text[last..markup.start()], false);
        }
        emit(markup.as_str(), true);
        last = markup.end();
    }
    if last < text.len() {
        emit(&text[last..], false);
    }
}
