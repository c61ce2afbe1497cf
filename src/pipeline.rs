//! The pipeline runner.
//!
//! A [`Pipeline`] is built once from a [`MinifyConfig`] and reused for every
//! document. Each document is processed in isolation: a failure is logged and
//! the original text is handed back with the error attached, so one bad page
//! never takes down a batch.

use std::fmt;
use std::time::Instant;

use optimizers::Optimizers;
use tracing::{debug, info, info_span, warn};
use whitespace::{WhitespaceCollapser, WhitespaceOptions};

use crate::config::MinifyConfig;
use crate::exclude::Exclusions;
use crate::metrics::MetricsSpan;
use crate::validate::find_leak;
use crate::{Document, PipelineError, ProcessedDocument};

/// One rewrite step, listed in the order the pipeline applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    RemoveComments,
    SimplifyDoctype,
    CollapseWhitespace,
    CollapseBooleanAttributes,
    RemoveDefaultAttributes,
    CleanUrls,
    MinifyJsonData,
    RemoveAttributeQuotes,
    CollapseTagSpaces,
}

impl Transform {
    pub const ALL: [Transform; 9] = [
        Transform::RemoveComments,
        Transform::SimplifyDoctype,
        Transform::CollapseWhitespace,
        Transform::CollapseBooleanAttributes,
        Transform::RemoveDefaultAttributes,
        Transform::CleanUrls,
        Transform::MinifyJsonData,
        Transform::RemoveAttributeQuotes,
        Transform::CollapseTagSpaces,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transform::RemoveComments => "remove_comments",
            Transform::SimplifyDoctype => "simplify_doctype",
            Transform::CollapseWhitespace => "collapse_whitespace",
            Transform::CollapseBooleanAttributes => "collapse_boolean_attributes",
            Transform::RemoveDefaultAttributes => "remove_default_attributes",
            Transform::CleanUrls => "clean_urls",
            Transform::MinifyJsonData => "minify_json_data",
            Transform::RemoveAttributeQuotes => "remove_attribute_quotes",
            Transform::CollapseTagSpaces => "collapse_tag_spaces",
        }
    }

    fn enabled(self, config: &MinifyConfig) -> bool {
        match self {
            Transform::RemoveComments => config.remove_comments,
            Transform::SimplifyDoctype => config.simplify_doctype,
            Transform::CollapseWhitespace => config.collapse_whitespace,
            Transform::CollapseBooleanAttributes => config.collapse_boolean_attributes,
            Transform::RemoveDefaultAttributes => config.remove_default_attributes,
            Transform::CleanUrls => config.clean_urls,
            Transform::MinifyJsonData => config.minify_json_data,
            Transform::RemoveAttributeQuotes => config.remove_attribute_quotes,
            Transform::CollapseTagSpaces => config.collapse_tag_spaces,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated, ready-to-run set of transforms.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: MinifyConfig,
    transforms: Vec<Transform>,
    collapser: WhitespaceCollapser,
    optimizers: Optimizers,
    exclusions: Exclusions,
}

impl Pipeline {
    /// Validates `config` and resolves the active transforms.
    pub fn new(config: &MinifyConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let config = config.effective();

        let transforms: Vec<Transform> = Transform::ALL
            .into_iter()
            .filter(|transform| transform.enabled(&config))
            .collect();
        let collapser = WhitespaceCollapser::new(&WhitespaceOptions {
            preserve_tag_names: config.preserve_tags.clone(),
        })?;
        let optimizers = Optimizers::new(&config.preserve_tags)
            .map_err(|err| PipelineError::Config(format!("preserve_tags: {err}")))?;
        let exclusions = Exclusions::new(&config.exclude_tags)?;

        debug!(
            transforms = ?transforms.iter().map(|t| t.name()).collect::<Vec<_>>(),
            exclude_tags = ?config.exclude_tags,
            "pipeline ready"
        );
        Ok(Self {
            config,
            transforms,
            collapser,
            optimizers,
            exclusions,
        })
    }

    /// The configuration in effect, with `aggressive` already applied.
    pub fn config(&self) -> &MinifyConfig {
        &self.config
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|transform| transform.name()).collect()
    }

    /// Runs every active transform over `html`.
    ///
    /// Excluded elements are carved out first and restored last. The bodies of
    /// preserved elements, built-in and configured, pass through every
    /// optimizer unchanged. With
    /// `validate_output` set, output that still holds a placeholder token
    /// outside a quoted literal is rejected.
    pub fn run(&self, html: &str) -> Result<String, PipelineError> {
        let (mut current, excluded) = self.exclusions.carve(html);
        for &transform in &self.transforms {
            let metrics = MetricsSpan::start();
            let result = self.apply(transform, &current);
            if let Some(span) = metrics {
                span.record_transform(transform, result.as_ref().map(|_| ()).map_err(Clone::clone));
            }
            current = result?;
        }

        let restored = excluded.restore(&current);
        if self.config.validate_output {
            if let Some(leak) = find_leak(&restored) {
                return Err(PipelineError::PlaceholderLeak {
                    token: leak.token,
                    snippet: leak.snippet,
                });
            }
        }
        Ok(restored)
    }

    fn apply(&self, transform: Transform, html: &str) -> Result<String, PipelineError> {
        let out = match transform {
            Transform::RemoveComments => self.optimizers.remove_comments(html),
            Transform::SimplifyDoctype => self.optimizers.simplify_doctype(html),
            Transform::CollapseWhitespace => self.collapser.collapse(html)?,
            Transform::CollapseBooleanAttributes => self.optimizers.collapse_boolean_attributes(html),
            Transform::RemoveDefaultAttributes => self.optimizers.remove_default_attributes(html),
            Transform::CleanUrls => self.optimizers.clean_urls(html),
            Transform::MinifyJsonData => self.optimizers.minify_json_data(html),
            Transform::RemoveAttributeQuotes => self.optimizers.remove_attribute_quotes(html),
            Transform::CollapseTagSpaces => self.optimizers.collapse_tag_spaces(html),
        };
        Ok(out)
    }

    /// Processes one document. Never fails: on error the original text is
    /// returned with the error attached.
    pub fn process(&self, document: Document) -> ProcessedDocument {
        let span = info_span!("htmlpost.process", doc_id = %document.id);
        let _entered = span.enter();

        let started = Instant::now();
        let metrics = MetricsSpan::start();
        let original_len = document.html.len();

        match self.run(&document.html) {
            Ok(html) => {
                info!(
                    original_len,
                    optimized_len = html.len(),
                    elapsed_micros = elapsed_micros(started),
                    "process_success"
                );
                if let Some(span) = metrics {
                    span.record_document(Ok(()));
                }
                ProcessedDocument {
                    id: document.id,
                    original_len,
                    optimized_len: html.len(),
                    html,
                    error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, original_len, "process_failure");
                if let Some(span) = metrics {
                    span.record_document(Err(err.clone()));
                }
                ProcessedDocument {
                    id: document.id,
                    original_len,
                    optimized_len: original_len,
                    html: document.html,
                    error: Some(err),
                }
            }
        }
    }

    /// Processes documents independently, keeping their order. Runs on the
    /// rayon pool when the `parallel` switch is on.
    pub fn process_batch(&self, documents: Vec<Document>) -> Vec<ProcessedDocument> {
        debug!(count = documents.len(), parallel = self.config.parallel, "processing batch");
        self.process_all(documents)
    }

    #[cfg(feature = "parallel")]
    fn process_all(&self, documents: Vec<Document>) -> Vec<ProcessedDocument> {
        use rayon::prelude::*;

        if self.config.parallel {
            documents
                .into_par_iter()
                .map(|document| self.process(document))
                .collect()
        } else {
            documents
                .into_iter()
                .map(|document| self.process(document))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn process_all(&self, documents: Vec<Document>) -> Vec<ProcessedDocument> {
        documents
            .into_iter()
            .map(|document| self.process(document))
            .collect()
    }
}

fn elapsed_micros(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(config: MinifyConfig) -> Pipeline {
        Pipeline::new(&config).expect("valid config")
    }

    #[test]
    fn default_transforms_in_fixed_order() {
        assert_eq!(
            pipeline(MinifyConfig::default()).transform_names(),
            vec![
                "remove_comments",
                "simplify_doctype",
                "collapse_whitespace",
                "collapse_tag_spaces"
            ]
        );
    }

    #[test]
    fn aggressive_resolves_every_transform() {
        let pipeline = pipeline(MinifyConfig {
            aggressive: true,
            ..MinifyConfig::default()
        });
        assert_eq!(pipeline.transforms(), Transform::ALL.as_slice());
    }

    #[test]
    fn disabled_pipeline_is_identity() {
        let config = MinifyConfig {
            collapse_whitespace: false,
            remove_comments: false,
            simplify_doctype: false,
            collapse_tag_spaces: false,
            ..MinifyConfig::default()
        };
        let input = "<!DOCTYPE html>\n<p>  a  <!-- c --> </p>";
        assert_eq!(pipeline(config).run(input).unwrap(), input);
    }

    #[test]
    fn runs_default_transforms() {
        let out = pipeline(MinifyConfig::default())
            .run("<!DOCTYPE html>\n<html>\n<body  >\n  <p>  Hi <!-- x --> <b>there</b>  </p>\n</body>\n</html>")
            .unwrap();
        assert_eq!(out, "<!doctype html><html><body><p>Hi <b>there</b></p></body></html>");
    }

    #[test]
    fn excluded_regions_bypass_every_transform() {
        let out = pipeline(MinifyConfig {
            exclude_tags: vec!["template".into()],
            aggressive: true,
            ..MinifyConfig::default()
        })
        .run("<div>  <template>  <input disabled=\"disabled\"> <!-- k -->  </template>  </div>")
        .unwrap();
        assert_eq!(
            out,
            "<div><template>  <input disabled=\"disabled\"> <!-- k -->  </template></div>"
        );
    }

    #[test]
    fn preserved_bodies_bypass_the_optimizers() {
        let defaults = pipeline(MinifyConfig::default());
        let html = "<code><span  class=\"k\">x</span><!-- c --></code>";
        assert_eq!(defaults.run(html).unwrap(), html);

        let with_kbd = pipeline(MinifyConfig {
            preserve_tags: vec!["kbd".into()],
            aggressive: true,
            ..MinifyConfig::default()
        });
        let html = "<kbd><b  >a</b  ><!-- z --><input disabled=\"disabled\"></kbd>";
        assert_eq!(with_kbd.run(html).unwrap(), html);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Pipeline::new(&MinifyConfig {
            preserve_tags: vec!["<pre>".into()],
            ..MinifyConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(msg) if msg.contains("preserve_tags")));
    }

    #[test]
    fn process_keeps_original_on_failure() {
        let pipeline = pipeline(MinifyConfig {
            collapse_whitespace: false,
            ..MinifyConfig::default()
        });
        let html = "<p>  HTMLPOST7F3A_INLINE_0___  </p>";
        let processed = pipeline.process(Document::new("leaky", html));
        assert_eq!(processed.html, html);
        assert!(matches!(
            processed.error,
            Some(PipelineError::PlaceholderLeak { ref token, .. }) if token == "HTMLPOST7F3A_INLINE_0___"
        ));
        assert!(!processed.is_optimized());
        assert_eq!(processed.saved_bytes(), 0);
    }

    #[test]
    fn validation_can_be_switched_off() {
        let pipeline = pipeline(MinifyConfig {
            validate_output: false,
            ..MinifyConfig::default()
        });
        let html = "<p>  HTMLPOST7F3A_INLINE_0___  </p>";
        assert_eq!(pipeline.run(html).unwrap(), html);
    }

    #[test]
    fn batch_keeps_input_order() {
        let pipeline = pipeline(MinifyConfig::default());
        let documents: Vec<Document> = (0..32)
            .map(|i| Document::new(format!("doc-{i}"), format!("<p>  {i}  </p>")))
            .collect();
        let processed = pipeline.process_batch(documents);
        for (i, doc) in processed.iter().enumerate() {
            assert_eq!(doc.id, format!("doc-{i}"));
            assert_eq!(doc.html, format!("<p>{i}</p>"));
            assert_eq!(doc.saved_bytes(), 4);
        }
    }
}
