//! Loading of the fitted feature transformer and classifier artifacts

use crate::classifier::{FeatureTransformer, ReviewClassifier};
use crate::config::{ArtifactSource, DeviceSpec, ModelConfig};
use crate::linear::LogisticClassifier;
use crate::vectorizer::TfidfVectorizer;
use candle_core::Device;
use fraudfilter_core::{Error, Result};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// The transformer/classifier pair, loaded and checked for compatibility
#[derive(Clone)]
pub struct LoadedModels {
    transformer: Arc<dyn FeatureTransformer>,
    classifier: Arc<dyn ReviewClassifier>,
    metadata: ModelMetadata,
}

#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Transformer name (artifact file stem)
    pub transformer: String,

    /// Classifier name (artifact file stem)
    pub classifier: String,

    /// Feature dimension shared by both artifacts
    pub dimension: usize,

    /// Where the artifacts came from
    pub location: String,
}

impl LoadedModels {
    /// Pair an already-built transformer and classifier
    pub fn new(
        transformer: Arc<dyn FeatureTransformer>,
        classifier: Arc<dyn ReviewClassifier>,
    ) -> Result<Self> {
        Self::with_location(transformer, classifier, "in-memory")
    }

    fn with_location(
        transformer: Arc<dyn FeatureTransformer>,
        classifier: Arc<dyn ReviewClassifier>,
        location: impl Into<String>,
    ) -> Result<Self> {
        if transformer.dimension() != classifier.dimension() {
            return Err(Error::config(format!(
                "transformer '{}' produces {} features but classifier '{}' expects {}",
                transformer.name(),
                transformer.dimension(),
                classifier.name(),
                classifier.dimension()
            )));
        }

        let metadata = ModelMetadata {
            transformer: transformer.name().to_string(),
            classifier: classifier.name().to_string(),
            dimension: transformer.dimension(),
            location: location.into(),
        };

        Ok(Self {
            transformer,
            classifier,
            metadata,
        })
    }

    /// Load both artifacts from configuration
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let (transformer_path, classifier_path) = resolve_artifacts(config)?;
        debug!(
            "Resolved artifacts: transformer={:?} classifier={:?}",
            transformer_path, classifier_path
        );

        let device = create_device(config.device)?;

        let transformer = TfidfVectorizer::from_file(&transformer_path).map_err(|e| {
            Error::config(format!(
                "Failed to load feature transformer {:?}: {}",
                transformer_path, e
            ))
        })?;

        let classifier =
            LogisticClassifier::from_file(&classifier_path, config.decision_threshold, device)
                .map_err(|e| {
                    Error::config(format!(
                        "Failed to load classifier {:?}: {}",
                        classifier_path, e
                    ))
                })?;

        let location = describe_source(&config.source);
        let models = Self::with_location(Arc::new(transformer), Arc::new(classifier), location)?;

        info!(
            "Loaded models: transformer={} classifier={} dimension={}",
            models.metadata.transformer, models.metadata.classifier, models.metadata.dimension
        );

        Ok(models)
    }

    pub fn transformer(&self) -> &dyn FeatureTransformer {
        self.transformer.as_ref()
    }

    pub fn classifier(&self) -> &dyn ReviewClassifier {
        self.classifier.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Resolve both artifact paths, downloading them if the source is remote
fn resolve_artifacts(config: &ModelConfig) -> Result<(PathBuf, PathBuf)> {
    match &config.source {
        ArtifactSource::Local { path } => {
            let transformer = local_artifact(path, &config.transformer_file)?;
            let classifier = local_artifact(path, &config.classifier_file)?;
            Ok((transformer, classifier))
        }
        ArtifactSource::HuggingFace { repo, revision } => {
            let api = Api::new()
                .map_err(|e| Error::config(format!("Failed to initialize HF API: {}", e)))?;

            let repo = api.repo(Repo::with_revision(
                repo.clone(),
                RepoType::Model,
                revision.clone(),
            ));

            let fetch = |filename: &str| {
                repo.get(filename).map_err(|e| {
                    Error::config(format!("Failed to download {} from HF: {}", filename, e))
                })
            };

            let transformer = fetch(&config.transformer_file)?;
            let classifier = fetch(&config.classifier_file)?;
            Ok((transformer, classifier))
        }
    }
}

fn local_artifact(dir: &Path, filename: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    if !path.is_file() {
        return Err(Error::config(format!("Model artifact not found: {:?}", path)));
    }
    Ok(path)
}

fn describe_source(source: &ArtifactSource) -> String {
    match source {
        ArtifactSource::Local { path } => path.display().to_string(),
        ArtifactSource::HuggingFace { repo, revision } => format!("hf://{}@{}", repo, revision),
    }
}

/// Create Candle device from device spec
fn create_device(spec: DeviceSpec) -> Result<Device> {
    match spec {
        DeviceSpec::Cpu => Ok(Device::Cpu),
        DeviceSpec::Cuda => Device::new_cuda(0)
            .map_err(|e| Error::config(format!("Failed to create CUDA device: {}", e))),
        DeviceSpec::Metal => Device::new_metal(0)
            .map_err(|e| Error::config(format!("Failed to create Metal device: {}", e))),
    }
}
