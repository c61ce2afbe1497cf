use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use crate::PipelineError;
use crate::pipeline::Transform;

/// Metrics observer for pipeline transforms and documents.
pub trait PipelineMetrics: Send + Sync {
    fn record_transform(
        &self,
        transform: Transform,
        latency: Duration,
        result: Result<(), PipelineError>,
    );
    fn record_document(&self, latency: Duration, result: Result<(), PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record_transform(self, transform: Transform, result: Result<(), PipelineError>) {
        self.recorder
            .record_transform(transform, self.start.elapsed(), result);
    }

    pub(crate) fn record_document(self, result: Result<(), PipelineError>) {
        self.recorder.record_document(self.start.elapsed(), result);
    }
}
