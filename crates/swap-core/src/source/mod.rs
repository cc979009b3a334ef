//! Price Sources
//!
//! Where raw price records come from. The loader only sees the
//! [`PriceSource`] trait, so the public endpoint and in-memory fixtures are
//! interchangeable.

mod http;
mod mock;

pub use http::HttpPriceSource;
pub use mock::StaticPriceSource;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;
use crate::model::Asset;

/// Price source trait (Strategy pattern)
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch every raw record the source currently publishes
    async fn fetch(&self) -> Result<Vec<RawPriceRecord>, LoadError>;

    /// Source name, for logs
    fn name(&self) -> &str;
}

/// One untrusted record as published by the price endpoint.
///
/// Every field is optional and unknown fields are ignored; records that do not
/// carry a usable symbol and price are dropped during conversion. The
/// timestamp is informational and kept only when it parses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPriceRecord {
    #[serde(default, alias = "symbol")]
    pub currency: Option<String>,

    #[serde(default, alias = "asOf", alias = "as_of")]
    pub date: Option<String>,

    /// Number or numeric string
    #[serde(default, alias = "unitPrice", alias = "unit_price")]
    pub price: Option<Value>,
}

impl RawPriceRecord {
    pub fn new(currency: impl Into<String>, date: impl Into<String>, price: Value) -> Self {
        Self {
            currency: Some(currency.into()),
            date: Some(date.into()),
            price: Some(price),
        }
    }

    /// Convert into an [`Asset`] without judging the price's sign.
    pub fn to_asset(&self) -> Option<Asset> {
        let symbol = self.currency.as_deref().filter(|s| !s.is_empty())?;
        let as_of = self
            .date
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
            .map(|date| date.with_timezone(&Utc));
        let unit_price = parse_price(self.price.as_ref()?)?;

        Some(Asset::new(symbol, as_of, unit_price))
    }
}

fn parse_price(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Decode a price endpoint body: a JSON array of loosely shaped records.
///
/// The array itself must parse; individual entries that are not objects of the
/// expected shape become empty records and are discarded later.
pub fn parse_records(body: &str) -> Result<Vec<RawPriceRecord>, LoadError> {
    let values: Vec<Value> = serde_json::from_str(body)?;
    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}
