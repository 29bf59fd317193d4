//! FraudFilter Classifiers
//!
//! The review-authenticity detection pipeline:
//!
//! - [`registry::ModelRegistry`] loads the fitted feature transformer and
//!   classifier once and shares them read-only for the process lifetime
//! - [`source::ReviewAdapter`] turns uploaded tables or scraper output into
//!   canonical review records, normalizing text with [`normalizer::normalize`]
//! - [`detection::DetectionEngine`] classifies each record, dropping and
//!   reporting the ones that fail
//! - [`aggregator`] reduces verdicts to a product summary
//!
//! [`pipeline::ReviewPipeline`] chains all of the above for one request.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod linear;
pub mod model_loader;
pub mod normalizer;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod vectorizer;

pub use aggregator::{assemble_report, summarize};
pub use classifier::{FeatureTransformer, FeatureVector, Prediction, ReviewClassifier};
pub use config::{ArtifactSource, DeviceSpec, IngestConfig, ModelConfig, RatingScale};
pub use detection::{classify, DetectionEngine, DetectionReport};
pub use linear::{LogisticArtifact, LogisticClassifier};
pub use model_loader::{LoadedModels, ModelMetadata};
pub use normalizer::normalize;
pub use pipeline::ReviewPipeline;
pub use registry::ModelRegistry;
pub use source::{
    FieldValue, ReviewAdapter, ReviewSource, ScrapeResult, ScrapedReview, SourceBatch, Table,
};
pub use vectorizer::{Norm, TfidfVectorizer, VectorizerArtifact};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{FeatureTransformer, FeatureVector, Prediction, ReviewClassifier};
    pub use crate::config::{IngestConfig, ModelConfig};
    pub use crate::pipeline::ReviewPipeline;
    pub use crate::registry::ModelRegistry;
    pub use crate::source::{ReviewSource, ScrapeResult, Table};
}
