//! Swap Intent Executor
//!
//! Hands a validated [`SwapIntent`] to a settlement backend and turns the
//! outcome into a receipt the UI can display.

mod simulated;

pub use simulated::{FailureMode, SimulatedSettlement};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::model::SwapIntent;

/// Settlement backend trait (Strategy pattern)
///
/// The only implementation today is a simulation; failure injection lives
/// behind this seam.
#[async_trait]
pub trait SettlementBackend: Send + Sync {
    async fn settle(&self, intent: &SwapIntent) -> Result<(), ExecutionError>;

    fn name(&self) -> &str;
}

/// Success payload echoing what was swapped
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub id: Uuid,
    pub source_amount: String,
    pub source_asset: String,
    pub target_amount: String,
    pub target_asset: String,
    pub settled_at: DateTime<Utc>,
}

impl SwapReceipt {
    fn from_intent(intent: SwapIntent) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_amount: intent.source_amount().to_string(),
            source_asset: intent.source_asset().to_string(),
            target_amount: intent.target_amount().to_string(),
            target_asset: intent.target_asset().to_string(),
            settled_at: Utc::now(),
        }
    }

    /// Notification text for the user
    pub fn message(&self) -> String {
        format!(
            "Successfully swapped {} {} for {} {}!",
            self.source_amount, self.source_asset, self.target_amount, self.target_asset
        )
    }
}

pub struct SwapExecutor {
    backend: Arc<dyn SettlementBackend>,
}

impl SwapExecutor {
    pub fn new(backend: Arc<dyn SettlementBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Settle the intent. Consumes it so one intent is executed at most once.
    pub async fn execute(&self, intent: SwapIntent) -> Result<SwapReceipt, ExecutionError> {
        match self.backend.settle(&intent).await {
            Ok(()) => {
                let receipt = SwapReceipt::from_intent(intent);
                info!(
                    backend = self.backend.name(),
                    receipt = %receipt.id,
                    "{}",
                    receipt.message()
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    source = intent.source_asset(),
                    target = intent.target_asset(),
                    error = %e,
                    "swap settlement failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SwapForm;
    use std::time::Duration;

    fn intent() -> SwapIntent {
        let mut form = SwapForm::new("ETH", "USDC", "1.5");
        form.computed_target_amount = "3000.000000".into();
        SwapIntent::try_from_form(&form).unwrap()
    }

    #[tokio::test]
    async fn test_receipt_echoes_intent() {
        let executor = SwapExecutor::new(Arc::new(SimulatedSettlement::new(Duration::ZERO)));
        let receipt = executor.execute(intent()).await.unwrap();

        assert_eq!(receipt.source_amount, "1.5");
        assert_eq!(receipt.source_asset, "ETH");
        assert_eq!(receipt.target_amount, "3000.000000");
        assert_eq!(receipt.target_asset, "USDC");
        assert_eq!(
            receipt.message(),
            "Successfully swapped 1.5 ETH for 3000.000000 USDC!"
        );
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = SimulatedSettlement::new(Duration::ZERO)
            .with_failure(FailureMode::Always("venue closed".into()));
        let executor = SwapExecutor::new(Arc::new(backend));

        let err = executor.execute(intent()).await.unwrap_err();
        assert_eq!(err, ExecutionError::Rejected("venue closed".into()));
        assert_eq!(err.user_message(), "Swap failed. Please try again.");
    }
}
