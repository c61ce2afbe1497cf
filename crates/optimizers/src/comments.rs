use crate::markup::Segment;
use crate::Optimizers;

/// Comment prefixes that carry meaning and must survive.
const KEPT_COMMENT_PREFIXES: [&str; 3] = ["<!--[if", "<!--<!", "<!--!"];

/// Removes HTML comments, keeping conditional comments, `<!--!` comments and
/// anything inside verbatim elements. Unclosed comments are left in place.
pub fn remove_comments(html: &str) -> String {
    Optimizers::standard().remove_comments(html)
}

impl Optimizers {
    /// See [`remove_comments`].
    pub fn remove_comments(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        for segment in self.scanner.segments(html) {
            match segment {
                Segment::Comment(comment) if is_removable(comment) => {}
                Segment::Markup(text) | Segment::Verbatim(text) | Segment::Comment(text) => {
                    out.push_str(text)
                }
            }
        }
        out
    }
}

fn is_removable(comment: &str) -> bool {
    comment.ends_with("-->")
        && comment.len() >= "<!---->".len()
        && !KEPT_COMMENT_PREFIXES
            .iter()
            .any(|prefix| comment.starts_with(prefix))
}
