use thiserror::Error;

/// Errors that can occur while collapsing whitespace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WhitespaceError {
    #[error("invalid tag name {0:?}: expected [A-Za-z][A-Za-z0-9-]*")]
    InvalidTagName(String),
    #[error("failed to compile tag pattern: {0}")]
    Pattern(String),
    /// A placeholder of the collapser's own grammar outlived restoration.
    #[error("placeholder {token} survived restoration near {context:?}")]
    UnresolvedPlaceholder { token: String, context: String },
}
