//! Domain Models
//!
//! Core data types for the swap form: priced assets, the normalized catalog,
//! form state, validation results and validated swap intents.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable asset with its current unit price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Case-sensitive ticker symbol (e.g., "ETH", "stATOM")
    pub symbol: String,

    /// When the price was observed, if the source said so in a readable form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,

    /// Price of one unit in the reference currency (always > 0 in a catalog)
    pub unit_price: Decimal,
}

impl Asset {
    pub fn new(
        symbol: impl Into<String>,
        as_of: impl Into<Option<DateTime<Utc>>>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            as_of: as_of.into(),
            unit_price,
        }
    }
}

/// Normalized list of assets, sorted by symbol with no duplicates.
///
/// Only the loader builds catalogs from raw data; a catalog is never patched,
/// a reload replaces it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    assets: Vec<Asset>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Caller guarantees `assets` is sorted by symbol and duplicate free.
    pub(crate) fn from_sorted(assets: Vec<Asset>) -> Self {
        debug_assert!(assets.windows(2).all(|w| w[0].symbol < w[1].symbol));
        Self { assets }
    }

    pub fn get(&self, symbol: &str) -> Option<&Asset> {
        self.assets
            .binary_search_by(|asset| asset.symbol.as_str().cmp(symbol))
            .ok()
            .map(|index| &self.assets[index])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|asset| asset.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Default (source, target) selection: the first two entries.
    pub fn default_pair(&self) -> Option<(&str, &str)> {
        match self.assets.as_slice() {
            [first, second, ..] => Some((first.symbol.as_str(), second.symbol.as_str())),
            _ => None,
        }
    }
}

/// Swap form state as entered by the user.
///
/// `computed_target_amount` is derived; use [`crate::quote::derive_target_amount`]
/// after any change to the other three fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapForm {
    /// Selected source symbol, empty when nothing is selected
    #[serde(default)]
    pub source_asset: String,

    /// Selected target symbol, empty when nothing is selected
    #[serde(default)]
    pub target_asset: String,

    /// Raw amount text as typed
    #[serde(default)]
    pub source_amount: String,

    /// Derived target amount (6 fractional digits) or empty
    #[serde(default)]
    pub computed_target_amount: String,
}

impl SwapForm {
    pub fn new(
        source_asset: impl Into<String>,
        target_asset: impl Into<String>,
        source_amount: impl Into<String>,
    ) -> Self {
        Self {
            source_asset: source_asset.into(),
            target_asset: target_asset.into(),
            source_amount: source_amount.into(),
            computed_target_amount: String::new(),
        }
    }

    pub fn clear_amounts(&mut self) {
        self.source_amount.clear();
        self.computed_target_amount.clear();
    }
}

/// Form fields that can carry a validation message
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    SourceAmount,
    SourceAsset,
    TargetAsset,
    General,
}

/// Field-level error messages; empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<FormField, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result carrying only a form-wide message
    pub fn general(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.insert(FormField::General, message);
        result
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.keys().copied()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A swap request built from a form that passed validation.
///
/// Fields are private so an intent can only come out of
/// [`SwapIntent::try_from_form`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SwapIntent {
    source_asset: String,
    target_asset: String,
    source_amount: String,
    target_amount: String,
}

impl SwapIntent {
    /// Validate `form` and capture its current values.
    pub fn try_from_form(form: &SwapForm) -> Result<Self, ValidationResult> {
        let result = crate::validation::validate(form);
        if !result.is_valid() {
            return Err(result);
        }

        Ok(Self {
            source_asset: form.source_asset.clone(),
            target_asset: form.target_asset.clone(),
            source_amount: form.source_amount.clone(),
            target_amount: form.computed_target_amount.clone(),
        })
    }

    pub fn source_asset(&self) -> &str {
        &self.source_asset
    }

    pub fn target_asset(&self) -> &str {
        &self.target_asset
    }

    pub fn source_amount(&self) -> &str {
        &self.source_amount
    }

    pub fn target_amount(&self) -> &str {
        &self.target_amount
    }
}
