//! # swap-core
//!
//! Price-quote and swap-intent engine behind a token-swap form.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌──────────────┐
//! │ PriceSource  │──▶│ Catalog  │──▶│   quote    │──▶│ validate  │──▶│ SwapExecutor │
//! │ (http/static)│   │ (loader) │   │ (6 dp)     │   │ (per field│   │ (settlement) │
//! └──────────────┘   └──────────┘   └────────────┘   └───────────┘   └──────────────┘
//! ```
//!
//! The presentation layer owns a [`SwapSession`] and calls into it on every
//! event; the four entry points (`load`, `quote`, `validate`, `execute`) are
//! also usable directly.
//!
//! ## Example: 1.5 ETH to USDC
//!
//! ```text
//! catalog:  ETH = 2000, USDC = 1
//! rate:     2000 / 1 = 2000
//! quote:    1.5 * 2000 = "3000.000000"
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod icons;
pub mod loader;
pub mod model;
pub mod quote;
pub mod session;
pub mod source;
pub mod validation;

pub use config::SwapConfig;
pub use error::{ExecutionError, IconLoadError, LoadError, Result, SwapError};
pub use executor::{SettlementBackend, SimulatedSettlement, SwapExecutor, SwapReceipt};
pub use icons::{IconResolver, TokenIcon};
pub use loader::CatalogLoader;
pub use model::{Asset, Catalog, FormField, SwapForm, SwapIntent, ValidationResult};
pub use quote::{derive_target_amount, quote};
pub use session::{PendingSwap, SessionSnapshot, SwapPhase, SwapSession};
pub use source::{HttpPriceSource, PriceSource, RawPriceRecord, StaticPriceSource};
pub use validation::validate;
