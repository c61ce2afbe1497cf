use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::Segment;
use crate::Optimizers;

static DOCTYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("doctype pattern is valid"));

const HTML5_DOCTYPE: &str = "<!doctype html>";

/// Replaces the first document type declaration with `<!doctype html>`.
pub fn simplify_doctype(html: &str) -> String {
    Optimizers::standard().simplify_doctype(html)
}

impl Optimizers {
    pub fn simplify_doctype(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut replaced = false;
        for segment in self.scanner.segments(html) {
            match segment {
                Segment::Markup(markup) if !replaced && DOCTYPE_RE.is_match(markup) => {
                    out.push_str(&DOCTYPE_RE.replacen(markup, 1, HTML5_DOCTYPE));
                    replaced = true;
                }
                Segment::Markup(text) | Segment::Verbatim(text) | Segment::Comment(text) => {
                    out.push_str(text)
                }
            }
        }
        out
    }
}
