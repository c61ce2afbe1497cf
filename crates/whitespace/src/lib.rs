//! htmlpost whitespace core.
//!
//! Collapses whitespace in rendered HTML without changing what the browser
//! shows. The text goes through four stages, each producing a new string:
//!
//! 1. **Preserve extraction**: `pre`, `code`, `textarea`, `script`, `style`
//!    (plus any caller-supplied tags) are swapped for opaque placeholders.
//! 2. **Inline normalization**: inline elements (`a`, `span`, `em`, ...) and
//!    the whitespace touching them are swapped for placeholders; the
//!    surrounding whitespace shrinks to at most one space per side.
//! 3. **Block collapsing**: whitespace in every text segment between tags is
//!    collapsed to one space and trimmed.
//! 4. **Restoration**: every placeholder is replaced by its recorded content.
//!
//! ## Guarantees
//!
//! - Preserve element content comes back byte-for-byte.
//! - A word break next to an inline element survives as a single space.
//! - Running the collapser on its own output changes nothing.
//! - Text that already contains this crate's placeholder grammar is returned
//!   unchanged instead of being processed twice.
//!
//! ## Example
//!
//! ```rust
//! use whitespace::{collapse_whitespace, WhitespaceOptions};
//!
//! let html = "<div><pre>   keep   this   </pre><b>  bold text  </b></div>";
//! let out = collapse_whitespace(html, &WhitespaceOptions::default()).unwrap();
//! assert_eq!(out, "<div><pre>   keep   this   </pre><b>bold text</b></div>");
//! ```

mod collapse;
mod error;
mod inline;
pub mod placeholder;
mod preserve;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::placeholder::{context_snippet, find_placeholders, PlaceholderKind, PlaceholderTable};

pub use crate::collapse::{collapse_block_text, collapse_runs};
pub use crate::error::WhitespaceError;
pub use crate::inline::{normalize_inline, INLINE_TAGS, MAX_INLINE_PASSES};
pub use crate::preserve::{validate_tag_name, RegionExtractor, PRESERVE_TAGS};

/// Placeholder kinds produced and consumed by the collapser itself.
pub const OWN_KINDS: [PlaceholderKind; 2] = [PlaceholderKind::Preserve, PlaceholderKind::Inline];

/// Options for [`collapse_whitespace`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhitespaceOptions {
    /// Tags preserved in addition to [`PRESERVE_TAGS`], matched
    /// case-insensitively. Order is kept; duplicates are ignored.
    #[serde(default)]
    pub preserve_tag_names: Vec<String>,
}

/// A compiled collapser, reusable across documents and threads.
#[derive(Debug, Clone)]
pub struct WhitespaceCollapser {
    preserve: RegionExtractor,
}

impl WhitespaceCollapser {
    pub fn new(options: &WhitespaceOptions) -> Result<Self, WhitespaceError> {
        Ok(Self {
            preserve: RegionExtractor::preserve(&options.preserve_tag_names)?,
        })
    }

    /// Lowercased preserve tag names, fixed set first.
    pub fn preserve_tag_names(&self) -> &[String] {
        self.preserve.tag_names()
    }

    /// Collapses whitespace in `text`.
    ///
    /// Returns the input unchanged if it already holds PRESERVE or INLINE
    /// placeholders. Fails if a placeholder of those kinds is still present
    /// after restoration.
    pub fn collapse(&self, text: &str) -> Result<String, WhitespaceError> {
        if placeholder::contains_placeholder(text, &OWN_KINDS) {
            debug!(len = text.len(), "input already holds placeholders; skipping");
            return Ok(text.to_string());
        }

        let mut table = PlaceholderTable::new();
        let extracted = self.preserve.extract(text, &mut table);
        let inlined = normalize_inline(&extracted, &mut table);
        let collapsed = collapse_block_text(&inlined);
        let restored = table.restore(&collapsed);

        if let Some(leftover) = find_placeholders(&restored).find(|m| OWN_KINDS.contains(&m.kind)) {
            return Err(WhitespaceError::UnresolvedPlaceholder {
                token: leftover.token.to_string(),
                context: context_snippet(&restored, leftover.start, leftover.end).to_string(),
            });
        }

        debug!(
            preserved = table.len(PlaceholderKind::Preserve),
            inline = table.len(PlaceholderKind::Inline),
            original_len = text.len(),
            collapsed_len = restored.len(),
            "whitespace collapsed"
        );
        Ok(restored)
    }
}

/// Collapses whitespace in `text` using `options`.
///
/// Compiles the tag patterns on every call; build a [`WhitespaceCollapser`]
/// once when processing many documents.
pub fn collapse_whitespace(text: &str, options: &WhitespaceOptions) -> Result<String, WhitespaceError> {
    WhitespaceCollapser::new(options)?.collapse(text)
}
