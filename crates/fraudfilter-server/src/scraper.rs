//! Client for the external scraping service

use async_trait::async_trait;
use fraudfilter_classifiers::ScrapeResult;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ScraperConfig;

/// Scraping failures that never reached the pipeline
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("scraper request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("scraper returned HTTP {0}")]
    Status(u16),
}

/// Fetches reviews for a product page
#[async_trait]
pub trait ReviewScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapeResult, ScrapeError>;
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

/// Scraper reached over HTTP: `POST {"url": ...}` returns a [`ScrapeResult`]
pub struct HttpScraper {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpScraper {
    /// Build a client from config; `None` if no endpoint is configured
    pub fn from_config(config: &ScraperConfig) -> anyhow::Result<Option<Self>> {
        let Some(endpoint) = &config.endpoint else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            endpoint: endpoint.clone(),
            client,
        }))
    }
}

#[async_trait]
impl ReviewScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapeResult, ScrapeError> {
        debug!("Requesting scrape of {} from {}", url, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ScrapeRequest { url })
            .send()
            .await?;

        if !response.status().is_success() {
            error!("Scraper request failed: {}", response.status());
            return Err(ScrapeError::Status(response.status().as_u16()));
        }

        Ok(response.json::<ScrapeResult>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_endpoint_means_no_scraper() {
        let scraper = HttpScraper::from_config(&ScraperConfig::default()).unwrap();
        assert!(scraper.is_none());
    }

    #[test]
    fn test_endpoint_configured() {
        let config = ScraperConfig {
            endpoint: Some("http://127.0.0.1:9000/scrape".to_string()),
            timeout_secs: 5,
        };
        let scraper = HttpScraper::from_config(&config).unwrap().unwrap();
        assert_eq!(scraper.endpoint, "http://127.0.0.1:9000/scrape");
    }

    #[test]
    fn test_scrape_result_wire_format() {
        let body = r#"{
            "product_id": "B07X",
            "product_name": "Headphones",
            "csv_path": "scraped/B07X.csv",
            "reviews": [{"customer_review": "Great", "rating": 5}]
        }"#;
        let result: ScrapeResult = serde_json::from_str(body).unwrap();
        let reviews = result.reviews.unwrap();
        assert_eq!(reviews[0].text.as_deref(), Some("Great"));
    }
}
