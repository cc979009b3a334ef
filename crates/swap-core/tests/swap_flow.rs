//! End-to-end swap flow against in-memory price sources.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use swap_core::{
    quote, validate, CatalogLoader, FormField, RawPriceRecord, SimulatedSettlement,
    StaticPriceSource, SwapExecutor, SwapForm, SwapPhase, SwapSession,
};

fn record(symbol: &str, price: serde_json::Value) -> RawPriceRecord {
    RawPriceRecord::new(symbol, "2023-08-29T07:10:40.000Z", price)
}

async fn load(records: Vec<RawPriceRecord>) -> swap_core::Catalog {
    CatalogLoader::new(Arc::new(StaticPriceSource::new(records)))
        .load()
        .await
        .unwrap()
}

#[tokio::test]
async fn duplicates_collapse_to_first_occurrence() {
    let catalog = load(vec![
        record("ETH", json!(1645.93)),
        record("USDC", json!(1)),
        record("ETH", json!(1700)),
        record("USDC", json!(0.99)),
        record("ETH", json!(1500)),
    ])
    .await;

    let symbols: Vec<_> = catalog.symbols().collect();
    assert_eq!(symbols, vec!["ETH", "USDC"]);
    assert_eq!(catalog.get("ETH").unwrap().unit_price, dec!(1645.93));
    assert_eq!(catalog.get("USDC").unwrap().unit_price, dec!(1));
}

#[tokio::test]
async fn catalog_sorted_and_positive() {
    let catalog = load(vec![
        record("WBTC", json!(26002.82)),
        record("ZERO", json!(0)),
        record("ATOM", json!(7.18)),
        record("NEG", json!(-1)),
        record("EVMOS", json!(0.06)),
        record("BUSD", json!(0.9998)),
    ])
    .await;

    let symbols: Vec<_> = catalog.symbols().collect();
    let mut sorted = symbols.clone();
    sorted.sort_unstable();
    assert_eq!(symbols, sorted);
    assert!(catalog.iter().all(|asset| asset.unit_price > Decimal::ZERO));
    assert_eq!(catalog.len(), 4);
}

#[tokio::test]
async fn quote_properties() {
    let catalog = load(vec![record("ETH", json!(2000)), record("USDC", json!(1))]).await;

    assert_eq!(quote(&catalog, "ETH", "USDC", "1.5"), "3000.000000");
    assert_eq!(quote(&catalog, "ETH", "ETH", "1.5"), "1.500000");
    assert_eq!(quote(&catalog, "ETH", "USDC", "abc"), "");
    assert_eq!(
        quote(&catalog, "USDC", "ETH", "10"),
        quote(&catalog, "USDC", "ETH", "10")
    );
}

#[test]
fn validation_properties() {
    let result = validate(&SwapForm::new("", "BTC", "0"));
    let fields: Vec<_> = result.fields().collect();
    assert_eq!(fields, vec![FormField::SourceAmount, FormField::SourceAsset]);

    let result = validate(&SwapForm::new("BTC", "BTC", "10"));
    let fields: Vec<_> = result.fields().collect();
    assert_eq!(fields, vec![FormField::General]);
}

#[tokio::test(start_paused = true)]
async fn submit_walks_the_state_machine() {
    let loader = CatalogLoader::new(Arc::new(StaticPriceSource::from_prices(&[
        ("ETH", 2000.0),
        ("USDC", 1.0),
    ])));
    let executor = SwapExecutor::new(Arc::new(SimulatedSettlement::new(Duration::from_millis(
        2_000,
    ))));

    let mut session = SwapSession::default();
    session.load(&loader).await;
    session.set_source_amount("1.5");

    let mut phases = vec![session.phase()];

    let (attempt, intent) = session.begin_submit().unwrap().into_parts();
    phases.push(session.phase());

    let outcome = executor.execute(intent).await;
    session.finish_submit(attempt, outcome);
    phases.push(session.phase());

    session.acknowledge();
    phases.push(session.phase());

    assert_eq!(
        phases,
        vec![
            SwapPhase::Idle,
            SwapPhase::Submitting,
            SwapPhase::Succeeded,
            SwapPhase::Idle
        ]
    );

    let receipt = session.last_receipt().unwrap();
    assert_eq!(
        (
            receipt.source_amount.as_str(),
            receipt.source_asset.as_str(),
            receipt.target_amount.as_str(),
            receipt.target_asset.as_str()
        ),
        ("1.5", "ETH", "3000.000000", "USDC")
    );
}

#[tokio::test]
async fn toggle_uses_previous_quote_verbatim() {
    let loader = CatalogLoader::new(Arc::new(StaticPriceSource::from_prices(&[
        ("ETH", 2000.0),
        ("USDC", 1.0),
    ])));
    let mut session = SwapSession::default();
    session.load(&loader).await;
    session.set_source_amount("1.5");
    assert_eq!(session.form().computed_target_amount, "3000.000000");

    session.toggle_direction().unwrap();

    assert_eq!(session.form().source_asset, "USDC");
    assert_eq!(session.form().target_asset, "ETH");
    assert_eq!(session.form().source_amount, "3000.000000");
    assert_eq!(session.form().computed_target_amount, "1.500000");
}
