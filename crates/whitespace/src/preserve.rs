//! Extraction of elements whose content must stay byte-for-byte.
//!
//! The extractor scans for `<name ...>` openings of a configured tag set and
//! swaps each complete element, up to the nearest matching close tag, for a
//! placeholder. The same machinery carves out caller-excluded tags for the
//! pipeline runner, only with a different placeholder kind.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::error::WhitespaceError;
use crate::placeholder::{PlaceholderKind, PlaceholderTable};

/// Elements whose interior whitespace is always significant.
pub const PRESERVE_TAGS: [&str; 5] = ["pre", "code", "textarea", "script", "style"];

/// Finds complete elements of a tag set and replaces them with placeholders.
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    kind: PlaceholderKind,
    tag_names: Vec<String>,
    open: Option<Regex>,
    closers: HashMap<String, Regex>,
}

impl RegionExtractor {
    /// Compiles an extractor for `tag_names` (matched case-insensitively).
    ///
    /// Names are lowercased and de-duplicated in first-seen order. An empty
    /// set yields an extractor that never matches.
    pub fn new<I, S>(tag_names: I, kind: PlaceholderKind) -> Result<Self, WhitespaceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in tag_names {
            let name = name.as_ref();
            validate_tag_name(name)?;
            let lowered = name.to_ascii_lowercase();
            if !names.contains(&lowered) {
                names.push(lowered);
            }
        }

        let open = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Some(case_insensitive(&format!(
                r#"<({alternation})(?:[\t\n\x0C\r /](?:"[^"]*"|'[^']*'|[^'">])*)?>"#
            ))?)
        };

        let mut closers = HashMap::with_capacity(names.len());
        for name in &names {
            let closer = case_insensitive(&format!(r"</{}[\t\n\x0C\r ]*>", regex::escape(name)))?;
            closers.insert(name.clone(), closer);
        }

        Ok(Self {
            kind,
            tag_names: names,
            open,
            closers,
        })
    }

    /// Extractor for the fixed preserve set plus `extra` tag names.
    pub fn preserve<I, S>(extra: I) -> Result<Self, WhitespaceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = PRESERVE_TAGS
            .iter()
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(|name| name.as_ref().to_string()))
            .collect();
        Self::new(names, PlaceholderKind::Preserve)
    }

    pub fn kind(&self) -> PlaceholderKind {
        self.kind
    }

    pub fn tag_names(&self) -> &[String] {
        &self.tag_names
    }

    /// Replaces every closed element of the tag set with a placeholder,
    /// recording the original markup in `table`. Matches are non-overlapping
    /// and taken left to right; an opening tag with no matching close tag is
    /// left in place as literal text.
    pub fn extract(&self, text: &str, table: &mut PlaceholderTable) -> String {
        let Some(open) = &self.open else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut search = 0;
        while let Some(caps) = open.captures_at(text, search) {
            let (Some(opening), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let close = self
                .closers
                .get(&name.as_str().to_ascii_lowercase())
                .and_then(|closer| closer.find_at(text, opening.end()));
            match close {
                Some(close) => {
                    out.push_str(&text[cursor..opening.start()]);
                    let original = text[opening.start()..close.end()].to_string();
                    out.push_str(&table.push(self.kind, original));
                    cursor = close.end();
                    search = cursor;
                }
                None => search = opening.end(),
            }
        }
        out.push_str(&text[cursor..]);
        out
    }
}

/// Tag names must look like HTML element names.
pub fn validate_tag_name(name: &str) -> Result<(), WhitespaceError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(WhitespaceError::InvalidTagName(name.to_string()))
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, WhitespaceError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| WhitespaceError::Pattern(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::placeholder_token;

    fn preserve() -> RegionExtractor {
        RegionExtractor::preserve(Vec::<String>::new()).expect("default tags are valid")
    }

    #[test]
    fn replaces_preserve_elements() {
        let mut table = PlaceholderTable::new();
        let out = preserve().extract("<p>a</p><pre>  x  </pre><code> y </code>", &mut table);
        assert_eq!(
            out,
            format!(
                "<p>a</p>{}{}",
                placeholder_token(PlaceholderKind::Preserve, 0),
                placeholder_token(PlaceholderKind::Preserve, 1)
            )
        );
        assert_eq!(table.get(PlaceholderKind::Preserve, 0), Some("<pre>  x  </pre>"));
        assert_eq!(table.get(PlaceholderKind::Preserve, 1), Some("<code> y </code>"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut table = PlaceholderTable::new();
        let out = preserve().extract("<PRE class=\"x\">a  b</Pre >", &mut table);
        assert_eq!(out, placeholder_token(PlaceholderKind::Preserve, 0));
        assert_eq!(
            table.get(PlaceholderKind::Preserve, 0),
            Some("<PRE class=\"x\">a  b</Pre >")
        );
    }

    #[test]
    fn stops_at_nearest_close_of_same_name() {
        let mut table = PlaceholderTable::new();
        let out = preserve().extract("<pre><b> x </b></pre> mid <pre>y</pre>", &mut table);
        assert_eq!(table.len(PlaceholderKind::Preserve), 2);
        assert_eq!(table.get(PlaceholderKind::Preserve, 0), Some("<pre><b> x </b></pre>"));
        assert!(out.contains(" mid "));
    }

    #[test]
    fn similar_tag_names_do_not_match() {
        let mut table = PlaceholderTable::new();
        let input = "<preview> a </preview><codes> b </codes>";
        assert_eq!(preserve().extract(input, &mut table), input);
        assert!(table.is_empty());
    }

    #[test]
    fn unclosed_preserve_tag_is_left_literal() {
        let mut table = PlaceholderTable::new();
        let out = preserve().extract("<pre>  open <code> c </code>", &mut table);
        assert_eq!(
            out,
            format!("<pre>  open {}", placeholder_token(PlaceholderKind::Preserve, 0))
        );
    }

    #[test]
    fn attribute_values_may_contain_gt() {
        let mut table = PlaceholderTable::new();
        let out = preserve().extract(r#"<script data-x="a>b"> if (a > b) {} </script>"#, &mut table);
        assert_eq!(out, placeholder_token(PlaceholderKind::Preserve, 0));
    }

    #[test]
    fn extra_tags_are_preserved() {
        let extractor = RegionExtractor::preserve(["Math-Block"]).expect("valid");
        assert!(extractor.tag_names().contains(&"math-block".to_string()));
        let mut table = PlaceholderTable::new();
        let out = extractor.extract("<math-block>  x </math-block>", &mut table);
        assert_eq!(out, placeholder_token(PlaceholderKind::Preserve, 0));
    }

    #[test]
    fn rejects_invalid_tag_names() {
        for bad in ["", "1pre", "pre>", "a b", "x|y"] {
            assert!(matches!(
                RegionExtractor::new([bad], PlaceholderKind::Exclude),
                Err(WhitespaceError::InvalidTagName(_))
            ));
        }
    }

    #[test]
    fn empty_tag_set_never_matches() {
        let extractor = RegionExtractor::new(Vec::<&str>::new(), PlaceholderKind::Exclude)
            .expect("empty set is valid");
        let mut table = PlaceholderTable::new();
        assert_eq!(extractor.extract("<pre> x </pre>", &mut table), "<pre> x </pre>");
    }
}
