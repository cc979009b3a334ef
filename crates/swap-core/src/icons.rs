//! Asset Icon Resolution
//!
//! Best-effort per-symbol icons. Once an icon fails to load for a symbol the
//! resolver hands out a letter glyph for the rest of the session.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_ICON_BASE_URL;
use crate::error::IconLoadError;

/// What the UI should draw for a symbol
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenIcon {
    Remote { url: String },
    Glyph { initial: char },
}

#[derive(Clone, Debug)]
pub struct IconResolver {
    base_url: String,
    failed: HashSet<String>,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL)
    }
}

impl IconResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            failed: HashSet::new(),
        }
    }

    pub fn icon_url(&self, symbol: &str) -> String {
        format!("{}/{}.svg", self.base_url, symbol)
    }

    pub fn resolve(&self, symbol: &str) -> TokenIcon {
        if self.failed.contains(symbol) {
            TokenIcon::Glyph {
                initial: fallback_glyph(symbol),
            }
        } else {
            TokenIcon::Remote {
                url: self.icon_url(symbol),
            }
        }
    }

    /// Remember a failed lookup; returns false if it was already known.
    pub fn mark_failed(&mut self, error: IconLoadError) -> bool {
        debug!(symbol = %error.symbol, "icon lookup failed, using glyph");
        self.failed.insert(error.symbol)
    }

    pub fn has_failed(&self, symbol: &str) -> bool {
        self.failed.contains(symbol)
    }
}

/// Uppercased first character, `?` for an empty symbol
pub fn fallback_glyph(symbol: &str) -> char {
    symbol
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}
