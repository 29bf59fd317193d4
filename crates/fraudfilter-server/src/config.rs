//! Server configuration

use fraudfilter_classifiers::{ArtifactSource, IngestConfig, ModelConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Model artifact location and inference settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Column contract for uploaded tables
    #[serde(default)]
    pub ingest: IngestConfig,

    /// HTTP settings
    #[serde(default)]
    pub server: HttpConfig,

    /// Scraping service
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(dir) = &cli.model_dir {
            config.model.source = ArtifactSource::Local { path: dir.clone() };
        }

        if let Some(url) = &cli.scraper_url {
            config.scraper.endpoint = Some(url.clone());
        }

        Ok(config)
    }
}

/// HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Scraping service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Scraper endpoint; `/analyze` is disabled when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_scraper_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_scraper_timeout(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_scraper_timeout() -> u64 {
    60
}
