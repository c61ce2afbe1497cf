use crate::Optimizers;

/// `(tag, attribute, value)` triples where the value is what browsers assume
/// when the attribute is absent. Values compare case-insensitively after
/// trimming.
const DEFAULT_ATTRIBUTES: [(&str, &str, &str); 7] = [
    ("script", "type", "text/javascript"),
    ("script", "language", "javascript"),
    ("style", "type", "text/css"),
    ("link", "type", "text/css"),
    ("form", "method", "get"),
    ("input", "type", "text"),
    ("area", "shape", "rect"),
];

/// Removes attributes that restate the browser default.
pub fn remove_default_attributes(html: &str) -> String {
    Optimizers::standard().remove_default_attributes(html)
}

impl Optimizers {
    pub fn remove_default_attributes(&self, html: &str) -> String {
        self.scanner.rewrite_tag_attributes(html, |tag, attribute| {
            let value = attribute.value()?.trim();
            DEFAULT_ATTRIBUTES
                .iter()
                .any(|(default_tag, name, default_value)| {
                    tag.eq_ignore_ascii_case(default_tag)
                        && attribute.name_is(name)
                        && value.eq_ignore_ascii_case(default_value)
                })
                .then(String::new)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_script_and_style_types() {
        assert_eq!(
            remove_default_attributes(
                r#"<script type="text/javascript" src="a.js"></script><style type='text/css'>p{}</style>"#
            ),
            r#"<script src="a.js"></script><style>p{}</style>"#
        );
    }

    #[test]
    fn removes_form_and_input_defaults() {
        assert_eq!(
            remove_default_attributes(r#"<form METHOD="GET"><input type="text" name="q"></form>"#),
            r#"<form><input name="q"></form>"#
        );
    }

    #[test]
    fn attribute_must_belong_to_its_tag() {
        let input = r#"<button type="text">x</button><script type="module"></script>"#;
        assert_eq!(remove_default_attributes(input), input);
    }

    #[test]
    fn valueless_attribute_is_kept() {
        let input = "<script type defer></script>";
        assert_eq!(remove_default_attributes(input), input);
    }
}
