//! Output check for placeholder tokens that escaped restoration.

use whitespace::placeholder::{context_snippet, find_placeholders};

/// A placeholder token found in finished output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Leak {
    pub token: String,
    pub snippet: String,
}

/// Returns the first placeholder token in `output` that is not inside a
/// quoted literal.
///
/// A token sits inside a literal when the text between it and the nearest
/// preceding `>` or newline holds an odd number of `"`, `'` or backtick
/// characters. Pages that mention the grammar in a script string or an
/// attribute value therefore pass, while an apostrophe in earlier prose does
/// not hide a token. A string literal that itself contains `>` before the
/// token is reported as a leak.
pub(crate) fn find_leak(output: &str) -> Option<Leak> {
    find_placeholders(output)
        .find(|found| !inside_quoted_literal(output, found.start))
        .map(|found| Leak {
            token: found.token.to_string(),
            snippet: context_snippet(output, found.start, found.end).to_string(),
        })
}

fn inside_quoted_literal(text: &str, position: usize) -> bool {
    let scope_start = text[..position]
        .rfind(['\n', '>'])
        .map_or(0, |boundary| boundary + 1);
    let before = &text[scope_start..position];
    ['"', '\'', '`']
        .iter()
        .any(|quote| before.matches(*quote).count() % 2 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whitespace::placeholder::{PlaceholderKind, placeholder_token};

    #[test]
    fn clean_output_has_no_leak() {
        assert_eq!(find_leak("<p>hello</p>"), None);
    }

    #[test]
    fn bare_token_is_a_leak() {
        let token = placeholder_token(PlaceholderKind::Inline, 4);
        let leak = find_leak(&format!("<p>a {token} b</p>")).expect("leak");
        assert_eq!(leak.token, token);
        assert!(leak.snippet.contains("<p>a "));
    }

    #[test]
    fn tokens_in_string_literals_are_ignored() {
        let token = placeholder_token(PlaceholderKind::Preserve, 0);
        for line in [
            format!("<script>var a = \"{token}\";</script>"),
            format!("<script>var a = '{token}';</script>"),
            format!("<script>var a = `{token}`;</script>"),
        ] {
            assert_eq!(find_leak(&line), None, "{line}");
        }
    }

    #[test]
    fn tokens_in_attribute_values_are_ignored() {
        let token = placeholder_token(PlaceholderKind::Inline, 2);
        assert_eq!(find_leak(&format!("<p title=\"x {token}\">a</p>")), None);
    }

    #[test]
    fn apostrophes_in_earlier_prose_do_not_hide_a_leak() {
        let token = placeholder_token(PlaceholderKind::Exclude, 0);
        let leak = find_leak(&format!("<p>It's</p><p>{token}</p>")).expect("leak");
        assert_eq!(leak.token, token);
    }

    #[test]
    fn quotes_on_earlier_lines_do_not_count() {
        let token = placeholder_token(PlaceholderKind::Exclude, 1);
        let output = format!("<p title=\"it's\">\n{token}</p>");
        assert!(find_leak(&output).is_some());
    }
}
