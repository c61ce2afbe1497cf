use crate::markup::{parse_attributes, StartTag};
use crate::Optimizers;

/// Tidies whitespace inside tags.
///
/// Attributes are re-joined with single spaces, whitespace around `=` and
/// before `>` or `/>` is dropped, and `</p  >` becomes `</p>`. Quoted values
/// are copied as written. Tags whose attribute text cannot be parsed are left
/// untouched.
pub fn collapse_tag_spaces(html: &str) -> String {
    Optimizers::standard().collapse_tag_spaces(html)
}

impl Optimizers {
    pub fn collapse_tag_spaces(&self, html: &str) -> String {
        let tidied = self.scanner.rewrite_start_tags(html, tidy_start_tag);
        self.scanner.tidy_end_tags(&tidied)
    }
}

fn tidy_start_tag(tag: StartTag<'_>) -> Option<String> {
    let (attributes, self_closing) = parse_attributes(tag.attributes)?;

    let mut out = String::with_capacity(tag.name.len() + tag.attributes.len() + 2);
    out.push('<');
    out.push_str(tag.name);
    for attribute in &attributes {
        out.push(' ');
        out.push_str(attribute.name);
        if let Some(value) = attribute.raw_value {
            out.push('=');
            out.push_str(value);
        }
    }
    if self_closing {
        let unquoted_last = attributes
            .last()
            .is_some_and(|last| last.raw_value.is_some() && last.quote().is_none());
        if unquoted_last {
            out.push(' ');
        }
        out.push('/');
    }
    out.push('>');
    Some(out)
}
