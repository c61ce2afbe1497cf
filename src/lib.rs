//! Workspace umbrella crate for htmlpost.
//!
//! This crate stitches the whitespace core and the size optimizers into one
//! configurable [`Pipeline`] that processes rendered HTML documents singly or
//! in batches.
//!
//! ```rust
//! use htmlpost::{Document, MinifyConfig, Pipeline};
//!
//! let pipeline = Pipeline::new(&MinifyConfig::default()).unwrap();
//! let processed = pipeline.process(Document::new("index", "<p>  Hello   <em>world</em> </p>"));
//! assert_eq!(processed.html, "<p>Hello <em>world</em></p>");
//! assert!(processed.is_optimized());
//! ```

pub mod config;
mod exclude;
mod metrics;
pub mod pipeline;
mod validate;

pub use config::{CONFIG_VERSION, ConfigLoadError, MinifyConfig};
pub use metrics::{PipelineMetrics, set_pipeline_metrics};
pub use pipeline::{Pipeline, Transform};
pub use whitespace::{
    WhitespaceCollapser, WhitespaceError, WhitespaceOptions, collapse_whitespace,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a pipeline or processing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("whitespace collapsing failed: {0}")]
    Whitespace(#[from] WhitespaceError),

    #[error("placeholder {token} leaked into output near {snippet:?}")]
    PlaceholderLeak { token: String, snippet: String },
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

/// One rendered page to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-chosen identifier, used in logs only.
    pub id: String,
    pub html: String,
}

impl Document {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
        }
    }
}

/// The outcome of processing one [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub id: String,
    /// Optimized HTML, or the original text when `error` is set.
    pub html: String,
    pub original_len: usize,
    pub optimized_len: usize,
    pub error: Option<PipelineError>,
}

impl ProcessedDocument {
    /// Bytes removed by the pipeline.
    pub fn saved_bytes(&self) -> usize {
        self.original_len.saturating_sub(self.optimized_len)
    }

    /// True if the pipeline succeeded for this document.
    pub fn is_optimized(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs `html` through a pipeline built from `config`.
///
/// Builds the pipeline on every call; construct a [`Pipeline`] once when
/// processing many documents.
pub fn minify(html: &str, config: &MinifyConfig) -> Result<String, PipelineError> {
    Pipeline::new(config)?.run(html)
}
