//! Runtime Configuration
//!
//! Everything is read from environment variables with sane defaults, so a bare
//! `swap-server` talks to the public price endpoint with a 2s simulated
//! settlement.

use std::time::Duration;

use crate::error::{Result, SwapError};

pub const DEFAULT_PRICE_SOURCE_URL: &str = "https://interview.switcheo.com/prices.json";
pub const DEFAULT_ICON_BASE_URL: &str =
    "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens";

#[derive(Clone, Debug)]
pub struct SwapConfig {
    /// Endpoint returning the raw price records
    pub price_source_url: String,

    /// Request timeout for the price endpoint, in seconds
    pub request_timeout_secs: u64,

    /// Artificial settlement latency, in milliseconds
    pub settlement_latency_ms: u64,

    /// Probability (0.0 - 1.0) that a simulated settlement fails
    pub settlement_failure_rate: f64,

    /// Base URL for per-symbol SVG icons
    pub icon_base_url: String,

    /// Seconds a form session may sit untouched before it is evicted
    pub form_idle_ttl_secs: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            price_source_url: DEFAULT_PRICE_SOURCE_URL.into(),
            request_timeout_secs: 10,
            settlement_latency_ms: 2_000,
            settlement_failure_rate: 0.0,
            icon_base_url: DEFAULT_ICON_BASE_URL.into(),
            form_idle_ttl_secs: 30 * 60,
        }
    }
}

impl SwapConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or unparsable numeric values
    /// fall back to defaults; an out-of-range failure rate is rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            price_source_url: lookup("PRICE_SOURCE_URL").unwrap_or(defaults.price_source_url),
            request_timeout_secs: lookup("PRICE_SOURCE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            settlement_latency_ms: lookup("SETTLEMENT_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.settlement_latency_ms),
            settlement_failure_rate: lookup("SETTLEMENT_FAILURE_RATE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.settlement_failure_rate),
            icon_base_url: lookup("TOKEN_ICON_BASE_URL").unwrap_or(defaults.icon_base_url),
            form_idle_ttl_secs: lookup("FORM_IDLE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.form_idle_ttl_secs),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.settlement_failure_rate) {
            return Err(SwapError::Config(format!(
                "SETTLEMENT_FAILURE_RATE must be within 0.0..=1.0, got {}",
                self.settlement_failure_rate
            )));
        }
        if self.form_idle_ttl_secs == 0 {
            return Err(SwapError::Config("FORM_IDLE_TTL_SECS must be positive".into()));
        }
        if self.price_source_url.trim().is_empty() {
            return Err(SwapError::Config("PRICE_SOURCE_URL is empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settlement_latency(&self) -> Duration {
        Duration::from_millis(self.settlement_latency_ms)
    }

    pub fn form_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.form_idle_ttl_secs)
    }
}
