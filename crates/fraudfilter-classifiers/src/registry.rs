//! Process-wide model registry
//!
//! The registry is built once at start-up and never mutated afterwards, so it
//! can be shared across concurrent requests behind an `Arc` without locking.
//! A failed load does not abort start-up: the registry records the cause and
//! every classification request is refused with `ModelUnavailable`.

use crate::config::ModelConfig;
use crate::model_loader::{LoadedModels, ModelMetadata};
use fraudfilter_core::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

enum RegistryState {
    Ready(LoadedModels),
    Unavailable { cause: String },
}

/// Holds the fitted transformer/classifier pair for the process lifetime
pub struct ModelRegistry {
    state: RegistryState,
}

impl ModelRegistry {
    /// Load both artifacts; on failure return an unavailable registry
    pub fn initialize(config: &ModelConfig) -> Self {
        info!("Initializing model registry");

        match LoadedModels::load(config) {
            Ok(models) => {
                info!("Model registry ready ({})", models.metadata().location);
                Self::from_models(models)
            }
            Err(e) => {
                warn!("Model registry unavailable: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Registry over an already-loaded pair
    pub fn from_models(models: LoadedModels) -> Self {
        Self {
            state: RegistryState::Ready(models),
        }
    }

    /// Registry that refuses all classification
    pub fn unavailable(cause: impl Into<String>) -> Self {
        Self {
            state: RegistryState::Unavailable {
                cause: cause.into(),
            },
        }
    }

    /// True iff both artifacts loaded successfully
    pub fn is_ready(&self) -> bool {
        matches!(self.state, RegistryState::Ready(_))
    }

    /// The loaded pair, or `ModelUnavailable`
    pub fn models(&self) -> Result<&LoadedModels> {
        match &self.state {
            RegistryState::Ready(models) => Ok(models),
            RegistryState::Unavailable { cause } => Err(Error::model_unavailable(cause.clone())),
        }
    }

    /// Why loading failed, if it did
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            RegistryState::Ready(_) => None,
            RegistryState::Unavailable { cause } => Some(cause),
        }
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        match &self.state {
            RegistryState::Ready(models) => Some(models.metadata()),
            RegistryState::Unavailable { .. } => None,
        }
    }

    /// Wrap for sharing across threads
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
