use crate::Optimizers;

/// Attributes whose presence alone sets them.
pub const BOOLEAN_ATTRIBUTES: [&str; 25] = [
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Drops the value of boolean attributes written as `name=""` or
/// `name="name"`.
pub fn collapse_boolean_attributes(html: &str) -> String {
    Optimizers::standard().collapse_boolean_attributes(html)
}

impl Optimizers {
    pub fn collapse_boolean_attributes(&self, html: &str) -> String {
        self.scanner.rewrite_tag_attributes(html, |_, attribute| {
            let value = attribute.value()?;
            let is_boolean = BOOLEAN_ATTRIBUTES
                .iter()
                .any(|name| attribute.name_is(name));
            (is_boolean && (value.is_empty() || value.eq_ignore_ascii_case(attribute.name)))
                .then(|| attribute.without_value())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_self_named_values() {
        assert_eq!(
            collapse_boolean_attributes(r#"<input type="checkbox" checked="checked" disabled="">"#),
            r#"<input type="checkbox" checked disabled>"#
        );
    }

    #[test]
    fn comparison_ignores_case() {
        assert_eq!(
            collapse_boolean_attributes("<option SELECTED='Selected'>x</option>"),
            "<option SELECTED>x</option>"
        );
    }

    #[test]
    fn other_values_are_kept() {
        let input = r#"<video autoplay="false" data-x="x" title="">"#;
        assert_eq!(collapse_boolean_attributes(input), input);
    }

    #[test]
    fn boolean_text_in_scripts_is_ignored() {
        let input = r#"<script>el.innerHTML = '<input disabled="disabled">';</script>"#;
        assert_eq!(collapse_boolean_attributes(input), input);
    }
}
