//! Static Price Source
//!
//! For testing and offline demos. Serves a fixed record list, optionally
//! failing every fetch.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::{PriceSource, RawPriceRecord};
use crate::error::LoadError;

/// In-memory price source
#[derive(Debug, Default)]
pub struct StaticPriceSource {
    records: Vec<RawPriceRecord>,
    failure: Option<String>,
    fetches: AtomicUsize,
}

impl StaticPriceSource {
    pub fn new(records: Vec<RawPriceRecord>) -> Self {
        Self {
            records,
            failure: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Build from `(symbol, price)` pairs sharing one timestamp
    pub fn from_prices(prices: &[(&str, f64)]) -> Self {
        Self::new(
            prices
                .iter()
                .map(|(symbol, price)| {
                    RawPriceRecord::new(*symbol, "2023-08-29T07:10:40.000Z", json!(price))
                })
                .collect(),
        )
    }

    /// A source whose every fetch fails
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// A handful of tokens with prices close to the public feed
    pub fn sample() -> Self {
        Self::from_prices(&[
            ("USDC", 1.0),
            ("ETH", 1645.93),
            ("ATOM", 7.186_657),
            ("WBTC", 26_002.82),
            ("OSMO", 0.377_265_6),
            ("SWTH", 0.004_039_85),
            ("USDC", 0.999_9),
            ("LUNA", 0.0),
        ])
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch(&self) -> Result<Vec<RawPriceRecord>, LoadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(reason) => Err(LoadError::Source(reason.clone())),
            None => Ok(self.records.clone()),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
