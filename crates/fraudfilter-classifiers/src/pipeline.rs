//! End-to-end review pipeline
//!
//! One request is one batch, run straight through:
//! source adapter (with normalization) -> detection engine -> aggregator.

use crate::aggregator::assemble_report;
use crate::config::IngestConfig;
use crate::detection::DetectionEngine;
use crate::registry::ModelRegistry;
use crate::source::{ReviewAdapter, ReviewSource};
use fraudfilter_core::{AnalysisReport, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Adapter and engine bundled behind one call
#[derive(Clone)]
pub struct ReviewPipeline {
    adapter: ReviewAdapter,
    engine: DetectionEngine,
}

impl ReviewPipeline {
    /// Create a pipeline over a shared registry
    pub fn new(registry: Arc<ModelRegistry>, ingest: IngestConfig) -> Self {
        Self {
            adapter: ReviewAdapter::new(ingest),
            engine: DetectionEngine::new(registry),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.engine.registry()
    }

    pub fn is_ready(&self) -> bool {
        self.registry().is_ready()
    }

    /// Run one batch through the pipeline
    ///
    /// Model readiness is checked before the input is inspected, so an
    /// unavailable registry always reports `ModelUnavailable` even when the
    /// input is also malformed.
    pub fn analyze(&self, source: ReviewSource) -> Result<AnalysisReport> {
        self.registry().models()?;

        let batch = self.adapter.adapt(source)?;
        debug!(
            "Adapted {} reviews ({} skipped)",
            batch.reviews.len(),
            batch.skipped_count()
        );
        metrics::counter!("fraudfilter_reviews_skipped_total")
            .increment(batch.skipped_count() as u64);

        let detection = self.engine.classify(&batch.reviews)?;
        let report = assemble_report(batch.product, batch.skipped, detection);

        info!(
            "Batch done: {} input, {} fake / {} classified, {} skipped, {} failed",
            report.total_input,
            report.summary.fake_count,
            report.summary.total_reviews,
            report.skipped_count,
            report.failed_count
        );

        Ok(report)
    }
}
