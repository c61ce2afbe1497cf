//! Configuration files for the htmlpost pipeline.
//!
//! A configuration is a flat set of switches, loaded from JSON or YAML. Every
//! key is optional; unknown keys are rejected.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: 1
//! aggressive: false
//! collapse_whitespace: true
//! remove_comments: true
//! preserve_tags: ["kbd"]
//! exclude_tags: ["svg"]
//! parallel: true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use whitespace::validate_tag_name;

/// The only configuration schema version understood.
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur when loading configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("unsupported config format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Switches for every pipeline transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    /// Configuration schema version
    pub version: u32,

    /// Turn on every optional optimizer
    pub aggressive: bool,

    pub collapse_whitespace: bool,
    pub remove_comments: bool,
    pub simplify_doctype: bool,
    pub collapse_tag_spaces: bool,
    pub collapse_boolean_attributes: bool,
    pub remove_default_attributes: bool,
    pub clean_urls: bool,
    pub minify_json_data: bool,
    pub remove_attribute_quotes: bool,

    /// Tags whose content keeps its whitespace, on top of the fixed set
    pub preserve_tags: Vec<String>,

    /// Tags carved out before any transform runs and restored verbatim
    pub exclude_tags: Vec<String>,

    /// Fail documents whose output still holds placeholder tokens
    pub validate_output: bool,

    /// Process batches on the rayon pool
    pub parallel: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            aggressive: false,
            collapse_whitespace: true,
            remove_comments: true,
            simplify_doctype: true,
            collapse_tag_spaces: true,
            collapse_boolean_attributes: false,
            remove_default_attributes: false,
            clean_urls: false,
            minify_json_data: false,
            remove_attribute_quotes: false,
            preserve_tags: Vec::new(),
            exclude_tags: Vec::new(),
            validate_output: true,
            parallel: true,
        }
    }
}

impl MinifyConfig {
    /// Load a configuration file, choosing the format by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content = fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            _ => Err(ConfigLoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parse JSON configuration from a string
    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        let config: MinifyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MinifyConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigLoadError::Validation(format!(
                "unsupported config version {} (expected {CONFIG_VERSION})",
                self.version
            )));
        }
        for (field, tags) in [
            ("preserve_tags", &self.preserve_tags),
            ("exclude_tags", &self.exclude_tags),
        ] {
            for tag in tags {
                validate_tag_name(tag).map_err(|err| {
                    ConfigLoadError::Validation(format!("{field}: {err}"))
                })?;
            }
        }
        Ok(())
    }

    /// The configuration with `aggressive` folded into the optimizer switches.
    pub fn effective(&self) -> Self {
        if !self.aggressive {
            return self.clone();
        }
        Self {
            collapse_whitespace: true,
            remove_comments: true,
            simplify_doctype: true,
            collapse_tag_spaces: true,
            collapse_boolean_attributes: true,
            remove_default_attributes: true,
            clean_urls: true,
            minify_json_data: true,
            remove_attribute_quotes: true,
            ..self.clone()
        }
    }
}
