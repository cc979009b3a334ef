//! Quote Calculator
//!
//! `target = amount * price(source) / price(target)`, rendered with six
//! fractional digits. A missing asset or unparsable amount is not an error:
//! the quote is simply empty.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{Catalog, SwapForm};

/// Fractional digits in every rendered amount or rate
pub const QUOTE_DECIMALS: u32 = 6;

/// Parse user-entered amount text. Accepts plain and exponent notation;
/// surrounding whitespace is ignored.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Render with exactly [`QUOTE_DECIMALS`] fractional digits.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(QUOTE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(QUOTE_DECIMALS);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// How many units of `target` one unit of `source` buys
pub fn rate(catalog: &Catalog, source: &str, target: &str) -> Option<Decimal> {
    let source = catalog.get(source)?;
    let target = catalog.get(target)?;
    source.unit_price.checked_div(target.unit_price)
}

pub fn target_amount(catalog: &Catalog, source: &str, target: &str, amount_text: &str) -> Option<Decimal> {
    let rate = rate(catalog, source, target)?;
    parse_amount(amount_text)?.checked_mul(rate)
}

/// Quote `amount_text` of `source` in `target`; empty when no quote is possible.
pub fn quote(catalog: &Catalog, source: &str, target: &str, amount_text: &str) -> String {
    target_amount(catalog, source, target, amount_text)
        .map(format_amount)
        .unwrap_or_default()
}

/// The "1 SOURCE = x TARGET" figure, or empty.
pub fn exchange_rate(catalog: &Catalog, source: &str, target: &str) -> String {
    rate(catalog, source, target)
        .map(format_amount)
        .unwrap_or_default()
}

/// Return `form` with `computed_target_amount` recomputed from the rest.
pub fn derive_target_amount(mut form: SwapForm, catalog: &Catalog) -> SwapForm {
    form.computed_target_amount = quote(
        catalog,
        &form.source_asset,
        &form.target_asset,
        &form.source_amount,
    );
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize;
    use crate::source::RawPriceRecord;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn catalog() -> Catalog {
        normalize(&[
            RawPriceRecord::new("ETH", "2023-08-29T07:10:40.000Z", json!(2000)),
            RawPriceRecord::new("USDC", "2023-08-29T07:10:40.000Z", json!(1)),
            RawPriceRecord::new("ATOM", "2023-08-29T07:10:40.000Z", json!(7.186657)),
        ])
    }

    #[test]
    fn test_eth_to_usdc() {
        assert_eq!(quote(&catalog(), "ETH", "USDC", "1.5"), "3000.000000");
    }

    #[test]
    fn test_usdc_to_eth() {
        assert_eq!(quote(&catalog(), "USDC", "ETH", "3000"), "1.500000");
        assert_eq!(quote(&catalog(), "USDC", "ETH", "1"), "0.000500");
    }

    #[test]
    fn test_same_asset_is_identity() {
        assert_eq!(quote(&catalog(), "ATOM", "ATOM", "12.25"), "12.250000");
    }

    #[test]
    fn test_no_quote_cases() {
        let catalog = catalog();
        assert_eq!(quote(&catalog, "ETH", "USDC", "abc"), "");
        assert_eq!(quote(&catalog, "ETH", "USDC", ""), "");
        assert_eq!(quote(&catalog, "ETH", "USDC", "NaN"), "");
        assert_eq!(quote(&catalog, "ETH", "DOGE", "1"), "");
        assert_eq!(quote(&catalog, "", "USDC", "1"), "");
        assert_eq!(quote(&Catalog::empty(), "ETH", "USDC", "1"), "");
    }

    #[test]
    fn test_quote_is_pure() {
        let catalog = catalog();
        let first = quote(&catalog, "ATOM", "ETH", "42");
        assert_eq!(first, quote(&catalog, "ATOM", "ETH", "42"));
        assert!(!first.is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1.5 "), Some(dec!(1.5)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount("-2"), Some(dec!(-2)));
        assert_eq!(parse_amount("Infinity"), None);
        assert_eq!(parse_amount("1.5abc"), None);
    }

    #[test]
    fn test_format_amount_rounding() {
        assert_eq!(format_amount(dec!(0.0000005)), "0.000001");
        assert_eq!(format_amount(dec!(0.00000049)), "0.000000");
        assert_eq!(format_amount(dec!(-0.0000001)), "0.000000");
        assert_eq!(format_amount(dec!(7)), "7.000000");
    }

    #[test]
    fn test_exchange_rate() {
        assert_eq!(exchange_rate(&catalog(), "ETH", "USDC"), "2000.000000");
        assert_eq!(exchange_rate(&catalog(), "ETH", "DOGE"), "");
    }

    #[test]
    fn test_derive_target_amount() {
        let catalog = catalog();
        let mut form = SwapForm::new("ETH", "USDC", "2");
        form.computed_target_amount = "stale".into();

        let form = derive_target_amount(form, &catalog);
        assert_eq!(form.computed_target_amount, "4000.000000");

        let mut form = form;
        form.source_amount.clear();
        assert_eq!(derive_target_amount(form, &catalog).computed_target_amount, "");
    }
}
