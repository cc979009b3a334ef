//! token-swap HTTP Server
//!
//! Axum-based host for the swap core: price catalog, quotes, validation and
//! per-form swap sessions with simulated settlement.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap_core::{CatalogLoader, HttpPriceSource, SimulatedSettlement, SwapConfig, SwapExecutor};

use crate::handlers::{
    acknowledge_form, close_form, create_form, edit_form, get_catalog, get_form, get_icon,
    health_check, icon_failed, quote_handler, reload_catalog, reload_form, submit_form,
    toggle_form, validate_handler,
};
use crate::state::{spawn_form_sweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = SwapConfig::from_env()?;

    let source = HttpPriceSource::from_config(&config)?;
    tracing::info!("Price source: {}", source.url());
    let loader = CatalogLoader::new(Arc::new(source));

    let settlement = SimulatedSettlement::from_config(&config);
    tracing::info!(
        "Settlement: simulated, {}ms latency, {:.0}% failure rate",
        config.settlement_latency_ms,
        config.settlement_failure_rate * 100.0
    );
    let executor = SwapExecutor::new(Arc::new(settlement));

    let state = AppState::new(config, loader, executor);

    // Warm the shared catalog; an unreachable source just means an empty one.
    match state.loader.load().await {
        Ok(catalog) => {
            tracing::info!("✓ Loaded {} assets", catalog.len());
            *state.catalog.write().await = catalog;
        }
        Err(e) => {
            tracing::warn!("⚠ Price catalog unavailable: {}", e);
            tracing::warn!("  Retry with POST /api/catalog/reload");
        }
    }

    // Evict abandoned form sessions
    let sweep_every = state.config.form_idle_ttl().min(Duration::from_secs(60));
    spawn_form_sweeper(&state, sweep_every);
    tracing::info!("Form sessions expire after {}s idle", state.config.form_idle_ttl_secs);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health
        .route("/health", get(health_check))

        // Catalog & stateless calls
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/reload", post(reload_catalog))
        .route("/api/quote", post(quote_handler))
        .route("/api/validate", post(validate_handler))

        // Form sessions
        .route("/api/forms", post(create_form))
        .route("/api/forms/{id}", get(get_form).patch(edit_form).delete(close_form))
        .route("/api/forms/{id}/toggle", post(toggle_form))
        .route("/api/forms/{id}/reload", post(reload_form))
        .route("/api/forms/{id}/submit", post(submit_form))
        .route("/api/forms/{id}/acknowledge", post(acknowledge_form))
        .route("/api/forms/{id}/icons/{symbol}", get(get_icon))
        .route("/api/forms/{id}/icons/{symbol}/failed", post(icon_failed))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 swap-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                    - Health check");
    tracing::info!("  GET    /api/catalog               - Current price catalog");
    tracing::info!("  POST   /api/catalog/reload        - Re-fetch prices");
    tracing::info!("  POST   /api/quote                 - Quote an amount");
    tracing::info!("  POST   /api/validate              - Validate a swap form");
    tracing::info!("  POST   /api/forms                 - Open a swap form");
    tracing::info!("  PATCH  /api/forms/:id             - Edit fields");
    tracing::info!("  POST   /api/forms/:id/toggle      - Swap direction");
    tracing::info!("  POST   /api/forms/:id/submit      - Submit swap");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
