//! Caller-excluded regions.
//!
//! Excluded elements are swapped for EXCLUDE placeholders before any
//! transform runs and put back verbatim afterwards, so no transform ever sees
//! them.

use tracing::debug;
use whitespace::placeholder::{PlaceholderKind, PlaceholderTable, contains_placeholder};
use whitespace::{RegionExtractor, WhitespaceError};

#[derive(Debug, Clone)]
pub(crate) struct Exclusions {
    extractor: Option<RegionExtractor>,
}

impl Exclusions {
    pub(crate) fn new(tags: &[String]) -> Result<Self, WhitespaceError> {
        let extractor = if tags.is_empty() {
            None
        } else {
            Some(RegionExtractor::new(tags, PlaceholderKind::Exclude)?)
        };
        Ok(Self { extractor })
    }

    /// Replaces excluded elements in `text`. The returned table restores
    /// them; it is empty when nothing was carved out.
    pub(crate) fn carve(&self, text: &str) -> (String, PlaceholderTable) {
        let mut table = PlaceholderTable::new();
        let Some(extractor) = &self.extractor else {
            return (text.to_string(), table);
        };
        if contains_placeholder(text, &[PlaceholderKind::Exclude]) {
            debug!(len = text.len(), "input already holds exclude placeholders; not carving");
            return (text.to_string(), table);
        }
        let carved = extractor.extract(text, &mut table);
        debug!(excluded = table.len(PlaceholderKind::Exclude), "excluded regions carved out");
        (carved, table)
    }
}
