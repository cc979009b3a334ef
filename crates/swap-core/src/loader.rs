//! Price Catalog Loader
//!
//! Fetches raw records and normalizes them into a [`Catalog`]:
//!
//! 1. drop malformed records and non-positive prices
//! 2. keep the first occurrence of each symbol (source order)
//! 3. sort by symbol, case-sensitive

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::model::Catalog;
use crate::source::{PriceSource, RawPriceRecord};

pub struct CatalogLoader {
    source: Arc<dyn PriceSource>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and normalize. Always hits the source; nothing is cached.
    pub async fn load(&self) -> Result<Catalog, LoadError> {
        let records = self.source.fetch().await.inspect_err(|e| {
            warn!(source = self.source.name(), error = %e, "price catalog load failed");
        })?;

        let received = records.len();
        let catalog = normalize(&records);
        info!(
            source = self.source.name(),
            received,
            assets = catalog.len(),
            "price catalog loaded"
        );

        Ok(catalog)
    }
}

pub fn normalize(records: &[RawPriceRecord]) -> Catalog {
    let mut seen = HashSet::new();

    let mut assets: Vec<_> = records
        .iter()
        .filter_map(|record| {
            let asset = record.to_asset();
            if asset.is_none() {
                debug!(?record, "dropping malformed price record");
            }
            asset
        })
        .filter(|asset| asset.unit_price > Decimal::ZERO)
        .filter(|asset| seen.insert(asset.symbol.clone()))
        .collect();

    assets.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    Catalog::from_sorted(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticPriceSource;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record(symbol: &str, price: serde_json::Value) -> RawPriceRecord {
        RawPriceRecord::new(symbol, "2023-08-29T07:10:40.000Z", price)
    }

    #[test]
    fn test_first_duplicate_wins() {
        let catalog = normalize(&[
            record("USDC", json!(1.0)),
            record("ETH", json!(1645.93)),
            record("USDC", json!(0.9998)),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("USDC").unwrap().unit_price, dec!(1));
    }

    #[test]
    fn test_non_positive_removed_before_dedupe() {
        // A zero-priced first entry does not shadow a later valid one.
        let catalog = normalize(&[
            record("LUNA", json!(0)),
            record("ATOM", json!(-3)),
            record("LUNA", json!(0.5)),
        ]);

        assert_eq!(catalog.symbols().collect::<Vec<_>>(), vec!["LUNA"]);
        assert_eq!(catalog.get("LUNA").unwrap().unit_price, dec!(0.5));
    }

    #[test]
    fn test_sorted_case_sensitive() {
        let catalog = normalize(&[
            record("stATOM", json!(8.5)),
            record("USDC", json!(1)),
            record("ATOM", json!(7.2)),
            record("bNEO", json!(7.1)),
        ]);

        assert_eq!(
            catalog.symbols().collect::<Vec<_>>(),
            vec!["ATOM", "USDC", "bNEO", "stATOM"]
        );
    }

    #[test]
    fn test_malformed_records_skipped() {
        let catalog = normalize(&[RawPriceRecord::default(), record("ETH", json!("abc"))]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unreadable_timestamp_still_tradable() {
        let catalog = normalize(&[RawPriceRecord::new("OSMO", "29/08/2023", json!(0.377))]);
        let asset = catalog.get("OSMO").unwrap();
        assert_eq!(asset.unit_price, dec!(0.377));
        assert!(asset.as_of.is_none());
    }

    #[tokio::test]
    async fn test_load_refetches_every_time() {
        let source = Arc::new(StaticPriceSource::sample());
        let loader = CatalogLoader::new(source.clone());

        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetch_count(), 2);
        assert!(!first.contains("LUNA"));
        assert_eq!(first.get("USDC").unwrap().unit_price, dec!(1));
    }

    #[tokio::test]
    async fn test_load_failure() {
        let loader = CatalogLoader::new(Arc::new(StaticPriceSource::failing("offline")));
        let err = loader.load().await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to load token prices. Please try again.");
    }
}
