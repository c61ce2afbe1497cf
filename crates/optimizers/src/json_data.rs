use serde_json::Value;

use crate::markup::Attribute;
use crate::Optimizers;

/// Re-serializes JSON objects and arrays in `data-*` attributes without
/// insignificant whitespace. Key order and number spelling are kept. Values
/// that do not parse, or would not get shorter, are left as written.
pub fn minify_json_data(html: &str) -> String {
    Optimizers::standard().minify_json_data(html)
}

impl Optimizers {
    pub fn minify_json_data(&self, html: &str) -> String {
        self.scanner.rewrite_tag_attributes(html, |_, attribute| {
            let is_data = attribute
                .name
                .get(..5)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data-"));
            if !is_data {
                return None;
            }
            let compact = compact_json(attribute)?;
            let rewritten = attribute.with_value(&compact);
            (rewritten.len() < attribute.source.len()).then_some(rewritten)
        })
    }
}

fn compact_json(attribute: &Attribute<'_>) -> Option<String> {
    let raw = attribute.value()?;
    let trimmed = raw.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let decoded = decode_quotes(trimmed);
    let value: Value = serde_json::from_str(&decoded).ok()?;
    let compact = serde_json::to_string(&value).ok()?;
    Some(match attribute.quote() {
        Some('\'') => compact.replace('\'', "&#39;"),
        _ => compact,
    })
}

fn decode_quotes(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}
