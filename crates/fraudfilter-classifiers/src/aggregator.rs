//! Reduction of per-review verdicts into product-level statistics

use crate::detection::DetectionReport;
use fraudfilter_core::{AnalysisReport, ProductInfo, ProductSummary, ReviewId, Verdict};

/// Count and partition a batch of verdicts
pub fn summarize(verdicts: &[Verdict]) -> ProductSummary {
    let flagged_reviews: Vec<ReviewId> = verdicts
        .iter()
        .filter(|v| v.label.is_fake())
        .map(|v| v.review_id)
        .collect();

    let total_reviews = verdicts.len();
    let fake_count = flagged_reviews.len();

    let fake_rate = if total_reviews == 0 {
        0.0
    } else {
        fake_count as f64 / total_reviews as f64
    };

    ProductSummary {
        total_reviews,
        fake_count,
        genuine_count: total_reviews - fake_count,
        fake_rate,
        flagged_reviews,
    }
}

/// Merge the summary with adapter and engine exclusions into the response payload
pub fn assemble_report(
    product: Option<ProductInfo>,
    skipped: Vec<ReviewId>,
    detection: DetectionReport,
) -> AnalysisReport {
    let summary = summarize(&detection.verdicts);
    let status = detection.status();
    let skipped_count = skipped.len();
    let failed_count = detection.failed_count();

    AnalysisReport {
        product,
        total_input: summary.total_reviews + skipped_count + failed_count,
        summary,
        skipped_count,
        failed_count,
        skipped_reviews: skipped,
        failed_reviews: detection.failures,
        status,
    }
}
