use crate::Optimizers;

/// Attributes holding a single URL.
const URL_ATTRIBUTES: [&str; 6] = ["href", "src", "action", "cite", "poster", "formaction"];

const JAVASCRIPT_SCHEME: &str = "javascript:";

/// Trims whitespace around URL attribute values and strips a redundant
/// `javascript:` prefix from inline event handlers.
pub fn clean_urls(html: &str) -> String {
    Optimizers::standard().clean_urls(html)
}

impl Optimizers {
    pub fn clean_urls(&self, html: &str) -> String {
        self.scanner.rewrite_tag_attributes(html, |_, attribute| {
            let value = attribute.value()?;
            if URL_ATTRIBUTES.iter().any(|name| attribute.name_is(name)) {
                let trimmed = value.trim_matches(|ch: char| ch.is_ascii_whitespace());
                return (trimmed.len() != value.len()).then(|| attribute.with_value(trimmed));
            }
            if is_event_handler(attribute.name) {
                let trimmed = value.trim_start();
                let has_scheme = trimmed
                    .get(..JAVASCRIPT_SCHEME.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(JAVASCRIPT_SCHEME));
                if has_scheme {
                    let script = trimmed[JAVASCRIPT_SCHEME.len()..].trim_start();
                    return Some(attribute.with_value(script));
                }
            }
            None
        })
    }
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2
        && name
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_url_values() {
        assert_eq!(
            clean_urls("<a href=\"  /docs/ \n\">d</a><img src=' a.png '>"),
            "<a href=\"/docs/\">d</a><img src='a.png'>"
        );
    }

    #[test]
    fn strips_javascript_scheme_from_handlers() {
        assert_eq!(
            clean_urls(r#"<button onclick="JavaScript: go()">x</button>"#),
            r#"<button onclick="go()">x</button>"#
        );
    }

    #[test]
    fn javascript_hrefs_are_not_handlers() {
        let input = r#"<a href="javascript:void(0)">x</a>"#;
        assert_eq!(clean_urls(input), input);
    }

    #[test]
    fn other_attributes_are_untouched() {
        let input = r#"<img alt=" spaced " src="a.png" data-on="javascript:x">"#;
        assert_eq!(clean_urls(input), input);
    }
}
