//! Binary logistic-regression classifier running on Candle tensors

use crate::classifier::{FeatureVector, Prediction, ReviewClassifier};
use candle_core::{Device, Tensor};
use fraudfilter_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized form of a fitted binary logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    /// Exactly two class labels; the model scores `classes[1]`
    pub classes: Vec<String>,

    /// One weight per feature column
    pub coef: Vec<f32>,

    pub intercept: f32,

    /// Which of `classes` means a fabricated review
    #[serde(default = "default_fake_class")]
    pub fake_class: String,
}

pub struct LogisticClassifier {
    name: String,
    classes: Vec<String>,
    fake_is_positive: bool,
    weights: Tensor,
    intercept: f64,
    dimension: usize,
    threshold: f32,
    device: Device,
}

impl LogisticClassifier {
    /// Build from an already-parsed artifact
    pub fn from_artifact(
        name: impl Into<String>,
        artifact: LogisticArtifact,
        threshold: f32,
        device: Device,
    ) -> Result<Self> {
        if artifact.classes.len() != 2 {
            return Err(Error::config(format!(
                "expected exactly 2 classes, found {}",
                artifact.classes.len()
            )));
        }

        let fake_index = artifact
            .classes
            .iter()
            .position(|c| *c == artifact.fake_class)
            .ok_or_else(|| {
                Error::config(format!(
                    "fake class '{}' is not one of {:?}",
                    artifact.fake_class, artifact.classes
                ))
            })?;

        if artifact.coef.is_empty() {
            return Err(Error::config("classifier has no coefficients"));
        }

        if artifact.coef.iter().any(|v| !v.is_finite()) || !artifact.intercept.is_finite() {
            return Err(Error::config("classifier contains non-finite weights"));
        }

        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::config(format!(
                "decision threshold {} must be in (0, 1]",
                threshold
            )));
        }

        let dimension = artifact.coef.len();
        let weights = Tensor::from_vec(artifact.coef, (dimension, 1), &device).map_err(|e| {
            Error::classifier(format!("Failed to build weight tensor: {}", e))
        })?;

        Ok(Self {
            name: name.into(),
            classes: artifact.classes,
            fake_is_positive: fake_index == 1,
            weights,
            intercept: artifact.intercept as f64,
            dimension,
            threshold,
            device,
        })
    }

    /// Load from a JSON artifact file
    pub fn from_file(path: impl AsRef<Path>, threshold: f32, device: Device) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let artifact: LogisticArtifact = serde_json::from_str(&raw)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("logistic")
            .to_string();

        Self::from_artifact(name, artifact, threshold, device)
    }

    /// Class labels as exported by training
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Probability of `classes[1]`
    fn positive_probability(&self, features: &FeatureVector) -> Result<f32> {
        let input = Tensor::from_vec(features.to_dense(), (1, self.dimension), &self.device)
            .map_err(|e| Error::classifier(format!("Failed to build input tensor: {}", e)))?;

        let probability = input
            .matmul(&self.weights)
            .and_then(|logit| logit.affine(1.0, self.intercept))
            .and_then(|logit| candle_nn::ops::sigmoid(&logit))
            .and_then(|p| p.flatten_all())
            .and_then(|p| p.to_vec1::<f32>())
            .map_err(|e| Error::classifier(format!("Inference failed: {}", e)))?;

        probability
            .first()
            .copied()
            .ok_or_else(|| Error::classifier("Inference produced no output"))
    }
}

impl ReviewClassifier for LogisticClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if features.dimension() != self.dimension {
            return Err(Error::classifier(format!(
                "feature dimension {} does not match classifier dimension {}",
                features.dimension(),
                self.dimension
            )));
        }

        let positive = self.positive_probability(features)?;
        let fake_probability = if self.fake_is_positive {
            positive
        } else {
            1.0 - positive
        };

        Prediction::from_fake_probability(fake_probability, self.threshold)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn default_fake_class() -> String {
    "CG".to_string()
}
