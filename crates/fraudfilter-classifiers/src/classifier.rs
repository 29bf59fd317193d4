//! Feature transformer and classifier traits and common types

use fraudfilter_core::{Label, Result};

/// Trait for fitted feature transformers (text -> fixed-shape features)
pub trait FeatureTransformer: Send + Sync {
    /// Map review text to its feature representation
    fn transform(&self, text: &str) -> Result<FeatureVector>;

    /// Number of feature columns produced
    fn dimension(&self) -> usize;

    /// Get the transformer name
    fn name(&self) -> &str;
}

/// Trait for fitted review classifiers (features -> label + confidence)
pub trait ReviewClassifier: Send + Sync {
    /// Predict the label for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Number of feature columns this classifier expects
    fn dimension(&self) -> usize;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Sparse feature vector with a fixed dimension
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,

    /// (column, value) pairs sorted by column, no duplicates
    entries: Vec<(usize, f32)>,
}

impl FeatureVector {
    /// Build from (column, value) pairs; entries are sorted and must be in range
    pub fn from_sparse(dimension: usize, mut entries: Vec<(usize, f32)>) -> Result<Self> {
        entries.sort_by_key(|(col, _)| *col);
        if let Some((col, _)) = entries.iter().find(|(col, _)| *col >= dimension) {
            return Err(fraudfilter_core::Error::classifier(format!(
                "feature column {} out of range for dimension {}",
                col, dimension
            )));
        }
        entries.dedup_by_key(|(col, _)| *col);
        Ok(Self { dimension, entries })
    }

    /// All-zero vector
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// Number of non-zero columns
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dense copy, one value per column
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dimension];
        for &(col, value) in &self.entries {
            dense[col] = value;
        }
        dense
    }
}

/// Result of classifying one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted label
    pub label: Label,

    /// Probability of the predicted label (0.0-1.0)
    pub confidence: f32,

    /// Probability that the review is fake (0.0-1.0)
    pub fake_probability: f32,
}

impl Prediction {
    /// Derive label and confidence from the fake probability and a decision threshold
    pub fn from_fake_probability(fake_probability: f32, threshold: f32) -> Result<Self> {
        if !fake_probability.is_finite() || !(0.0..=1.0).contains(&fake_probability) {
            return Err(fraudfilter_core::Error::classifier(format!(
                "invalid fake probability {}",
                fake_probability
            )));
        }

        let (label, confidence) = if fake_probability >= threshold {
            (Label::Fake, fake_probability)
        } else {
            (Label::Genuine, 1.0 - fake_probability)
        };

        Ok(Self {
            label,
            confidence,
            fake_probability,
        })
    }
}
