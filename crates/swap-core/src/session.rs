//! Swap Form Session
//!
//! The mutable session copy owned by whatever renders the form. Every edit
//! goes through a method here, and every method re-derives the target amount,
//! so the derived field can never drift from its inputs.
//!
//! ```text
//!   Idle ──begin_submit──▶ Submitting ──finish_submit──▶ Succeeded | Failed
//!    ▲                                                        │
//!    └──────────────────────── acknowledge ───────────────────┘
//! ```
//!
//! Async work (catalog load, settlement) happens outside the session: the
//! caller takes a ticket or a [`PendingSwap`], awaits, then reports back.
//! Reports for superseded tickets or attempts are ignored, so a completion
//! that arrives after the form was reset or torn down changes nothing.

use serde::Serialize;
use tracing::debug;

use crate::error::{ExecutionError, LoadError, Result, SwapError};
use crate::executor::{SwapExecutor, SwapReceipt};
use crate::icons::{IconResolver, TokenIcon};
use crate::loader::CatalogLoader;
use crate::model::{Catalog, SwapForm, SwapIntent, ValidationResult};
use crate::quote::{derive_target_amount, exchange_rate};
use crate::validation::{validate, NO_QUOTE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Identifies one catalog load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A submission that has left the form and awaits settlement
#[derive(Debug)]
pub struct PendingSwap {
    attempt: u64,
    intent: SwapIntent,
}

impl PendingSwap {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn intent(&self) -> &SwapIntent {
        &self.intent
    }

    pub fn into_parts(self) -> (u64, SwapIntent) {
        (self.attempt, self.intent)
    }
}

/// Render-ready view of a session
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub form: SwapForm,
    pub errors: ValidationResult,
    pub phase: SwapPhase,
    pub loading: bool,
    pub can_submit: bool,
    pub exchange_rate: String,
    pub assets: usize,
    pub last_receipt: Option<SwapReceipt>,
}

#[derive(Debug)]
pub struct SwapSession {
    catalog: Catalog,
    form: SwapForm,
    errors: ValidationResult,
    phase: SwapPhase,
    icons: IconResolver,
    loading: bool,
    load_generation: u64,
    attempts: u64,
    active_attempt: Option<u64>,
    last_receipt: Option<SwapReceipt>,
}

impl Default for SwapSession {
    fn default() -> Self {
        Self::new(IconResolver::default())
    }
}

impl SwapSession {
    pub fn new(icons: IconResolver) -> Self {
        Self {
            catalog: Catalog::empty(),
            form: SwapForm::default(),
            errors: ValidationResult::new(),
            phase: SwapPhase::Idle,
            icons,
            loading: false,
            load_generation: 0,
            attempts: 0,
            active_attempt: None,
            last_receipt: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn form(&self) -> &SwapForm {
        &self.form
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_receipt(&self) -> Option<&SwapReceipt> {
        self.last_receipt.as_ref()
    }

    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }

    pub fn icons_mut(&mut self) -> &mut IconResolver {
        &mut self.icons
    }

    pub fn icon(&self, symbol: &str) -> TokenIcon {
        self.icons.resolve(symbol)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            form: self.form.clone(),
            errors: self.errors.clone(),
            phase: self.phase,
            loading: self.loading,
            can_submit: self.can_submit(),
            exchange_rate: exchange_rate(&self.catalog, &self.form.source_asset, &self.form.target_asset),
            assets: self.catalog.len(),
            last_receipt: self.last_receipt.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Start a load; any earlier outstanding ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.loading = true;
        LoadTicket(self.load_generation)
    }

    /// Install a load result. Returns false when `ticket` was superseded.
    ///
    /// On success, selections that still exist are kept and anything else
    /// falls back to the first two catalog entries. On failure the catalog is
    /// emptied, both selections are cleared and a general error is shown.
    pub fn apply_catalog(&mut self, ticket: LoadTicket, result: std::result::Result<Catalog, LoadError>) -> bool {
        if ticket.0 != self.load_generation {
            debug!(ticket = ticket.0, current = self.load_generation, "ignoring stale catalog load");
            return false;
        }
        self.loading = false;

        match result {
            Ok(catalog) => {
                self.catalog = catalog;
                self.errors = ValidationResult::new();
                let keep_selection = self.catalog.contains(&self.form.source_asset)
                    && self.catalog.contains(&self.form.target_asset);
                if !keep_selection {
                    if let Some((source, target)) = self.catalog.default_pair() {
                        self.form.source_asset = source.to_string();
                        self.form.target_asset = target.to_string();
                    }
                }
            }
            Err(e) => {
                self.catalog = Catalog::empty();
                self.form.source_asset.clear();
                self.form.target_asset.clear();
                self.errors = ValidationResult::general(e.user_message());
            }
        }

        self.rederive();
        true
    }

    pub async fn load(&mut self, loader: &CatalogLoader) -> bool {
        let ticket = self.begin_load();
        let result = loader.load().await;
        self.apply_catalog(ticket, result)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    pub fn set_source_asset(&mut self, symbol: impl Into<String>) {
        self.form.source_asset = symbol.into();
        self.rederive();
    }

    pub fn set_target_asset(&mut self, symbol: impl Into<String>) {
        self.form.target_asset = symbol.into();
        self.rederive();
    }

    pub fn set_source_amount(&mut self, amount: impl Into<String>) {
        self.form.source_amount = amount.into();
        self.rederive();
    }

    /// Picking an asset from the catalog list makes it the source.
    pub fn pick_from_list(&mut self, symbol: impl Into<String>) {
        self.form.source_asset = symbol.into();
        self.errors = ValidationResult::new();
        self.rederive();
    }

    /// Swap direction: the old quote becomes the new input amount.
    pub fn toggle_direction(&mut self) -> Result<()> {
        if self.phase == SwapPhase::Submitting {
            return Err(SwapError::SubmissionInFlight);
        }

        let form = &mut self.form;
        std::mem::swap(&mut form.source_asset, &mut form.target_asset);
        form.source_amount = std::mem::take(&mut form.computed_target_amount);
        self.errors = ValidationResult::new();
        self.rederive();
        Ok(())
    }

    fn rederive(&mut self) {
        self.form = derive_target_amount(std::mem::take(&mut self.form), &self.catalog);
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.phase != SwapPhase::Submitting
            && !self.form.source_amount.is_empty()
            && !self.form.source_asset.is_empty()
            && !self.form.target_asset.is_empty()
    }

    /// Validate and move to `Submitting`.
    ///
    /// A form that validates but has no quote (a symbol missing from the
    /// current catalog) is rejected with a general error. Calling this from
    /// `Succeeded` or `Failed` acknowledges the previous result first.
    pub fn begin_submit(&mut self) -> Result<PendingSwap> {
        if self.phase == SwapPhase::Submitting {
            return Err(SwapError::SubmissionInFlight);
        }
        self.acknowledge();

        self.errors = validate(&self.form);
        let intent = SwapIntent::try_from_form(&self.form).map_err(SwapError::Invalid)?;
        if intent.target_amount().is_empty() {
            self.errors = ValidationResult::general(NO_QUOTE);
            return Err(SwapError::Invalid(self.errors.clone()));
        }

        self.attempts += 1;
        self.active_attempt = Some(self.attempts);
        self.phase = SwapPhase::Submitting;

        Ok(PendingSwap {
            attempt: self.attempts,
            intent,
        })
    }

    /// Record the settlement outcome of `attempt`. Returns false (and changes
    /// nothing) if that attempt is no longer the active one.
    pub fn finish_submit(
        &mut self,
        attempt: u64,
        outcome: std::result::Result<SwapReceipt, ExecutionError>,
    ) -> bool {
        if self.active_attempt != Some(attempt) {
            debug!(attempt, "ignoring completion for inactive swap attempt");
            return false;
        }
        self.active_attempt = None;

        match outcome {
            Ok(receipt) => {
                self.phase = SwapPhase::Succeeded;
                self.form.clear_amounts();
                self.errors = ValidationResult::new();
                self.last_receipt = Some(receipt);
            }
            Err(e) => {
                self.phase = SwapPhase::Failed;
                self.errors = ValidationResult::general(e.user_message());
            }
        }
        true
    }

    /// Return from a finished attempt to `Idle`.
    pub fn acknowledge(&mut self) {
        if matches!(self.phase, SwapPhase::Succeeded | SwapPhase::Failed) {
            self.phase = SwapPhase::Idle;
        }
    }

    /// Abandon the in-flight attempt, if any; its completion will be ignored.
    pub fn abandon_submit(&mut self) {
        if self.active_attempt.take().is_some() {
            self.phase = SwapPhase::Idle;
        }
    }

    /// Run a whole submission against `executor`. The session ends in
    /// `Succeeded` or `Failed`; call [`Self::acknowledge`] to go back to `Idle`.
    pub async fn submit(&mut self, executor: &SwapExecutor) -> Result<SwapReceipt> {
        let (attempt, intent) = self.begin_submit()?.into_parts();
        let outcome = executor.execute(intent).await;
        self.finish_submit(attempt, outcome.clone());
        outcome.map_err(SwapError::from)
    }
}
