//! Swap Form Validator
//!
//! Every rule runs on every call so the form can show all problems at once.

use rust_decimal::Decimal;

use crate::model::{FormField, SwapForm, ValidationResult};
use crate::quote::parse_amount;

pub const INVALID_AMOUNT: &str = "Please enter a valid amount";
pub const MISSING_SOURCE: &str = "Please select a token to swap from";
pub const MISSING_TARGET: &str = "Please select a token to swap to";
pub const IDENTICAL_ASSETS: &str = "Cannot swap the same token";
pub const NO_QUOTE: &str = "No price available for this pair. Please reload and try again.";

pub fn validate(form: &SwapForm) -> ValidationResult {
    let mut result = ValidationResult::new();

    let amount_ok = parse_amount(&form.source_amount).is_some_and(|amount| amount > Decimal::ZERO);
    if !amount_ok {
        result.insert(FormField::SourceAmount, INVALID_AMOUNT);
    }

    let source_missing = form.source_asset.is_empty();
    let target_missing = form.target_asset.is_empty();

    if source_missing {
        result.insert(FormField::SourceAsset, MISSING_SOURCE);
    }
    if target_missing {
        result.insert(FormField::TargetAsset, MISSING_TARGET);
    }

    if form.source_asset == form.target_asset {
        result.insert(FormField::General, IDENTICAL_ASSETS);
    }

    result
}
