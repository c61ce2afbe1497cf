use crate::markup::is_unquoted_safe;
use crate::Optimizers;

/// Drops quotes around attribute values that are valid unquoted.
///
/// A value directly followed by `/` keeps its quotes, since the slash would
/// otherwise become part of the value.
pub fn remove_attribute_quotes(html: &str) -> String {
    Optimizers::standard().remove_attribute_quotes(html)
}

impl Optimizers {
    pub fn remove_attribute_quotes(&self, html: &str) -> String {
        self.scanner.rewrite_tag_attributes(html, |_, attribute| {
            attribute.quote()?;
            let value = attribute.value()?;
            (is_unquoted_safe(value) && !attribute.followed_by_slash).then(|| {
                format!(
                    "{}{}{}{}",
                    attribute.leading,
                    attribute.name,
                    attribute.equals.unwrap_or("="),
                    value
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquotes_simple_values() {
        assert_eq!(
            remove_attribute_quotes(r#"<a href="/docs/index.html" class='nav'>x</a>"#),
            "<a href=/docs/index.html class=nav>x</a>"
        );
    }

    #[test]
    fn keeps_quotes_when_needed() {
        let input = r#"<p title="two words" data-e="" data-q="a=b" data-t="`x`">x</p>"#;
        assert_eq!(remove_attribute_quotes(input), input);
    }

    #[test]
    fn keeps_quotes_before_self_closing_slash() {
        assert_eq!(
            remove_attribute_quotes(r#"<img alt="x" src="a.png"/>"#),
            r#"<img alt=x src="a.png"/>"#
        );
    }
}
