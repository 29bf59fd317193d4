//! Core types for FraudFilter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a review in its source (table row or scraped element), zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub usize);

impl ReviewId {
    /// Zero-based index into the originating rows
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One observed review, already normalized
///
/// A `Review` can only be built with non-empty text, so every record that
/// reaches classification carries something to classify.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    id: ReviewId,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reviewer_id: Option<String>,
}

impl Review {
    /// Create a review, or `None` if the text is blank
    pub fn new(id: ReviewId, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            id,
            text,
            rating: None,
            reviewer_id: None,
        })
    }

    /// Attach a rating
    pub fn with_rating(mut self, rating: Option<f32>) -> Self {
        self.rating = rating;
        self
    }

    /// Attach the reviewer identifier reported by the source
    pub fn with_reviewer(mut self, reviewer_id: Option<String>) -> Self {
        self.reviewer_id = reviewer_id;
        self
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    pub fn reviewer_id(&self) -> Option<&str> {
        self.reviewer_id.as_deref()
    }
}

/// Verdict label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Genuine,
    Fake,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genuine => "genuine",
            Self::Fake => "fake",
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Review this verdict belongs to
    pub review_id: ReviewId,

    /// Predicted label
    pub label: Label,

    /// Probability mass of the predicted label (0.0-1.0)
    pub confidence: f32,
}

impl Verdict {
    pub fn new(review_id: ReviewId, label: Label, confidence: f32) -> Self {
        Self {
            review_id,
            label,
            confidence,
        }
    }
}

/// A record dropped during classification, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub review_id: ReviewId,
    pub reason: String,
}

/// Product-level aggregate over one batch of verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Reviews successfully classified
    pub total_reviews: usize,

    pub fake_count: usize,

    pub genuine_count: usize,

    /// `fake_count / total_reviews`, 0 for an empty batch
    pub fake_rate: f64,

    /// Reviews labelled FAKE, in source order
    pub flagged_reviews: Vec<ReviewId>,
}

impl ProductSummary {
    /// Summary of a batch with no classified reviews
    pub fn empty() -> Self {
        Self {
            total_reviews: 0,
            fake_count: 0,
            genuine_count: 0,
            fake_rate: 0.0,
            flagged_reviews: Vec::new(),
        }
    }
}

/// Product metadata reported by the scraping source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: String,
    pub product_name: String,

    /// Where the scraper saved its copy of the reviews, if anywhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<String>,
}

/// How much of a batch made it through classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    /// Every record was classified
    Complete,
    /// Some records failed, the rest were classified
    Partial,
    /// Every record failed
    Failed,
}

/// Full accounting for one request: where every input row ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductInfo>,

    pub summary: ProductSummary,

    /// Rows seen in the input, before any filtering
    pub total_input: usize,

    pub skipped_count: usize,

    pub failed_count: usize,

    /// Rows dropped by the source adapter for blank text
    pub skipped_reviews: Vec<ReviewId>,

    /// Records dropped by the detection engine
    pub failed_reviews: Vec<RecordFailure>,

    pub status: DetectionStatus,
}
