//! Detection engine: runs the registry's transform + predict pair over a batch
//!
//! A failure on one record drops that record and is reported alongside the
//! verdicts; it never aborts the batch. Only an unavailable registry fails
//! the call as a whole, and it does so before any record is looked at.

use crate::classifier::Prediction;
use crate::model_loader::LoadedModels;
use crate::registry::ModelRegistry;
use fraudfilter_core::{DetectionStatus, RecordFailure, Result, Review, Verdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Verdicts for the records that classified, failures for those that did not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionReport {
    /// One verdict per successfully classified review, in input order
    pub verdicts: Vec<Verdict>,

    /// Records dropped during classification, in input order
    pub failures: Vec<RecordFailure>,

    /// Batch execution time
    pub latency_us: u64,
}

impl DetectionReport {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Complete, partial, or total failure
    pub fn status(&self) -> DetectionStatus {
        match (self.verdicts.is_empty(), self.failures.is_empty()) {
            (_, true) => DetectionStatus::Complete,
            (false, false) => DetectionStatus::Partial,
            (true, false) => DetectionStatus::Failed,
        }
    }
}

/// Classifies review batches against a shared model registry
#[derive(Clone)]
pub struct DetectionEngine {
    registry: Arc<ModelRegistry>,
}

impl DetectionEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Classify a batch
    ///
    /// Returns `ModelUnavailable` without touching `reviews` if the registry
    /// is not ready.
    pub fn classify(&self, reviews: &[Review]) -> Result<DetectionReport> {
        let models = self.registry.models()?;
        let start = Instant::now();

        let mut report = DetectionReport {
            verdicts: Vec::with_capacity(reviews.len()),
            ..Default::default()
        };

        for review in reviews {
            match classify_one(models, review) {
                Ok(prediction) => {
                    metrics::counter!(
                        "fraudfilter_reviews_classified_total",
                        "label" => prediction.label.as_str()
                    )
                    .increment(1);
                    report.verdicts.push(Verdict::new(
                        review.id(),
                        prediction.label,
                        prediction.confidence,
                    ));
                }
                Err(e) => {
                    warn!("Review {} failed classification: {}", review.id(), e);
                    metrics::counter!("fraudfilter_reviews_failed_total").increment(1);
                    report.failures.push(RecordFailure {
                        review_id: review.id(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!("fraudfilter_batch_latency_us").record(report.latency_us as f64);

        match report.status() {
            DetectionStatus::Failed => warn!(
                "Every review in the batch failed classification ({} records)",
                report.failed_count()
            ),
            _ => info!(
                "Classified {} reviews ({} failed) in {}us",
                report.verdicts.len(),
                report.failed_count(),
                report.latency_us
            ),
        }

        Ok(report)
    }
}

fn classify_one(models: &LoadedModels, review: &Review) -> Result<Prediction> {
    let features = models.transformer().transform(review.text())?;
    let prediction = models.classifier().predict(&features)?;
    debug!(
        "Review {}: {} ({:.3})",
        review.id(),
        prediction.label,
        prediction.confidence
    );
    Ok(prediction)
}

/// Classify a batch against a registry without keeping an engine around
pub fn classify(reviews: &[Review], registry: &Arc<ModelRegistry>) -> Result<DetectionReport> {
    DetectionEngine::new(Arc::clone(registry)).classify(reviews)
}
