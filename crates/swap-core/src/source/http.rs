//! HTTP Price Source
//!
//! Plain GET against a fixed JSON endpoint, no query parameters.

use async_trait::async_trait;
use tracing::debug;

use super::{parse_records, PriceSource, RawPriceRecord};
use crate::config::SwapConfig;
use crate::error::{LoadError, Result, SwapError};

pub struct HttpPriceSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPriceSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Create from configuration, applying the configured request timeout
    pub fn from_config(config: &SwapConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SwapError::Config(format!("HTTP client: {e}")))?;

        Ok(Self::new(client, config.price_source_url.clone()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> std::result::Result<Vec<RawPriceRecord>, LoadError> {
        debug!(url = %self.url, "fetching price records");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_records(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
