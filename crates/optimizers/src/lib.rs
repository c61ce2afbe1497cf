//! Single-pass size optimizers for rendered HTML.
//!
//! Each optimizer is an infallible `&str -> String` rewrite that leaves
//! anything it does not fully understand exactly as written. Tag and
//! attribute rewrites never look inside comments or the bodies of verbatim
//! elements: [`VERBATIM_TAGS`] always, plus any names an [`Optimizers`] value
//! was built with.
//!
//! ```rust
//! use optimizers::{collapse_boolean_attributes, collapse_tag_spaces, remove_comments};
//!
//! let html = "<input  disabled=\"disabled\"  ><!-- hint -->";
//! let out = collapse_tag_spaces(&collapse_boolean_attributes(&remove_comments(html)));
//! assert_eq!(out, "<input disabled>");
//! ```

mod boolean_attributes;
mod comments;
mod default_attributes;
mod doctype;
mod json_data;
mod markup;
mod quotes;
mod tag_spaces;
mod urls;

use once_cell::sync::Lazy;

pub use boolean_attributes::{collapse_boolean_attributes, BOOLEAN_ATTRIBUTES};
pub use comments::remove_comments;
pub use default_attributes::remove_default_attributes;
pub use doctype::simplify_doctype;
pub use json_data::minify_json_data;
pub use markup::VERBATIM_TAGS;
pub use quotes::remove_attribute_quotes;
pub use regex::Error as PatternError;
pub use tag_spaces::collapse_tag_spaces;
pub use urls::clean_urls;

static STANDARD: Lazy<Optimizers> =
    Lazy::new(|| Optimizers::new::<&str>(&[]).expect("standard verbatim tags are valid"));

/// The optimizers bound to a set of verbatim elements.
///
/// The free functions use [`Optimizers::standard`]. Build one with extra
/// names when callers preserve their own elements.
///
/// ```rust
/// use optimizers::Optimizers;
///
/// let optimizers = Optimizers::new(&["kbd"]).unwrap();
/// let html = "<kbd><b  >Ctrl</b><!-- key --></kbd><!-- note -->";
/// assert_eq!(
///     optimizers.collapse_tag_spaces(&optimizers.remove_comments(html)),
///     "<kbd><b  >Ctrl</b><!-- key --></kbd>"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Optimizers {
    scanner: markup::Scanner,
}

impl Optimizers {
    /// Treats `extra_tags` as verbatim on top of [`VERBATIM_TAGS`]. Names are
    /// matched case-insensitively; empty names and duplicates are ignored.
    pub fn new<S: AsRef<str>>(extra_tags: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            scanner: markup::Scanner::new(extra_tags)?,
        })
    }

    /// The optimizers for [`VERBATIM_TAGS`] only.
    pub fn standard() -> &'static Optimizers {
        &STANDARD
    }
}
