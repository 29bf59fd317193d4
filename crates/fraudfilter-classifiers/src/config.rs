//! Configuration for model artifacts and review ingestion

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how to load the feature transformer and classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Location holding both artifacts
    #[serde(default)]
    pub source: ArtifactSource,

    /// Feature transformer file name inside the source
    #[serde(default = "default_transformer_file")]
    pub transformer_file: String,

    /// Classifier file name inside the source
    #[serde(default = "default_classifier_file")]
    pub classifier_file: String,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Fake probability at or above which a review is labelled FAKE
    #[serde(default = "default_threshold")]
    pub decision_threshold: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ArtifactSource::default(),
            transformer_file: default_transformer_file(),
            classifier_file: default_classifier_file(),
            device: DeviceSpec::default(),
            decision_threshold: default_threshold(),
        }
    }
}

impl ModelConfig {
    /// Create a configuration reading artifacts from a local directory
    pub fn from_local(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: ArtifactSource::Local { path: dir.into() },
            ..Default::default()
        }
    }

    /// Create a configuration downloading artifacts from Hugging Face
    pub fn from_hf(repo: impl Into<String>) -> Self {
        Self {
            source: ArtifactSource::HuggingFace {
                repo: repo.into(),
                revision: default_revision(),
            },
            ..Default::default()
        }
    }

    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.decision_threshold = threshold;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }
}

/// Artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactSource {
    /// Directory on the local filesystem
    Local { path: PathBuf },

    /// Hugging Face Hub model repository
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl Default for ArtifactSource {
    fn default() -> Self {
        Self::Local {
            path: PathBuf::from("./models"),
        }
    }
}

/// Device specification
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda,
    Metal,
}

/// How to read reviews out of tabular input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Required column holding the review text
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Optional column holding the star rating
    #[serde(default = "default_rating_column")]
    pub rating_column: Option<String>,

    /// Optional column holding the reviewer identifier
    #[serde(default = "default_reviewer_column")]
    pub reviewer_column: Option<String>,

    /// Valid rating range; values outside it are dropped
    #[serde(default)]
    pub rating_scale: RatingScale,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            text_column: default_text_column(),
            rating_column: default_rating_column(),
            reviewer_column: default_reviewer_column(),
            rating_scale: RatingScale::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f32,
    pub max: f32,
}

impl RatingScale {
    /// Keep the rating only if it is finite and on the scale
    pub fn bound(&self, rating: f32) -> Option<f32> {
        (rating.is_finite() && rating >= self.min && rating <= self.max).then_some(rating)
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

fn default_transformer_file() -> String {
    "vectorizer.json".to_string()
}

fn default_classifier_file() -> String {
    "classifier.json".to_string()
}

fn default_threshold() -> f32 {
    0.5
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_text_column() -> String {
    "customer_review".to_string()
}

fn default_rating_column() -> Option<String> {
    Some("rating".to_string())
}

fn default_reviewer_column() -> Option<String> {
    Some("reviewer_id".to_string())
}
