//! Shared application state

use fraudfilter_classifiers::{ModelRegistry, ReviewPipeline};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::scraper::{HttpScraper, ReviewScraper};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Detection pipeline over the process-wide model registry
    pub pipeline: Arc<ReviewPipeline>,

    /// Scraping service, if one is configured
    pub scraper: Option<Arc<dyn ReviewScraper>>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    ///
    /// A model load failure does not stop startup: the registry comes up
    /// unavailable and the routes report it per request.
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> anyhow::Result<Self> {
        let registry = ModelRegistry::initialize(&config.model).shared();
        match registry.metadata() {
            Some(meta) => info!(
                "Models ready: {} + {} ({} features) from {}",
                meta.transformer, meta.classifier, meta.dimension, meta.location
            ),
            None => warn!("Starting without models; analysis requests will be refused"),
        }

        let scraper = HttpScraper::from_config(&config.scraper)?
            .map(|s| Arc::new(s) as Arc<dyn ReviewScraper>);
        if scraper.is_none() {
            info!("No scraper endpoint configured; /analyze is disabled");
        }

        Ok(Self::from_parts(config, registry, scraper, metrics_handle))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: ServerConfig,
        registry: Arc<ModelRegistry>,
        scraper: Option<Arc<dyn ReviewScraper>>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let pipeline = ReviewPipeline::new(registry, config.ingest.clone());
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            scraper,
            metrics_handle,
        }
    }
}
