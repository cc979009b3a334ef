//! Simulated Settlement
//!
//! No real trade happens: wait a fixed latency, then report the configured
//! outcome.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::SettlementBackend;
use crate::config::SwapConfig;
use crate::error::ExecutionError;
use crate::model::SwapIntent;

/// How a simulated settlement ends
#[derive(Clone, Debug, PartialEq)]
pub enum FailureMode {
    /// Always succeeds
    Never,

    /// Always rejected with the given reason
    Always(String),

    /// Fails with the given probability (0.0 - 1.0)
    Rate(f64),
}

pub struct SimulatedSettlement {
    latency: Duration,
    failure: FailureMode,
}

impl Default for SimulatedSettlement {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_000))
    }
}

impl SimulatedSettlement {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure: FailureMode::Never,
        }
    }

    pub fn from_config(config: &SwapConfig) -> Self {
        let settlement = Self::new(config.settlement_latency());
        if config.settlement_failure_rate > 0.0 {
            settlement.with_failure(FailureMode::Rate(config.settlement_failure_rate))
        } else {
            settlement
        }
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = match failure {
            FailureMode::Rate(p) => FailureMode::Rate(p.clamp(0.0, 1.0)),
            other => other,
        };
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn roll(&self) -> Result<(), ExecutionError> {
        match &self.failure {
            FailureMode::Never => Ok(()),
            FailureMode::Always(reason) => Err(ExecutionError::Rejected(reason.clone())),
            FailureMode::Rate(p) => {
                if rand::thread_rng().gen_bool(*p) {
                    Err(ExecutionError::Unavailable("simulated settlement failure".into()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[async_trait]
impl SettlementBackend for SimulatedSettlement {
    async fn settle(&self, intent: &SwapIntent) -> Result<(), ExecutionError> {
        debug!(
            source = intent.source_asset(),
            target = intent.target_asset(),
            latency_ms = self.latency.as_millis() as u64,
            "simulating settlement"
        );
        tokio::time::sleep(self.latency).await;
        self.roll()
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SwapForm;
    use tokio::time::Instant;

    fn intent() -> SwapIntent {
        SwapIntent::try_from_form(&SwapForm::new("ETH", "USDC", "1")).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_configured_latency() {
        let settlement = SimulatedSettlement::default();
        let started = Instant::now();

        settlement.settle(&intent()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn test_rate_extremes() {
        let always = SimulatedSettlement::new(Duration::ZERO).with_failure(FailureMode::Rate(1.0));
        assert!(matches!(
            always.settle(&intent()).await,
            Err(ExecutionError::Unavailable(_))
        ));

        let never = SimulatedSettlement::new(Duration::ZERO).with_failure(FailureMode::Rate(0.0));
        assert!(never.settle(&intent()).await.is_ok());
    }

    #[test]
    fn test_rate_is_clamped() {
        let settlement = SimulatedSettlement::new(Duration::ZERO).with_failure(FailureMode::Rate(7.0));
        assert_eq!(settlement.failure, FailureMode::Rate(1.0));
    }

    #[test]
    fn test_from_config() {
        let config = SwapConfig {
            settlement_latency_ms: 10,
            settlement_failure_rate: 0.25,
            ..Default::default()
        };
        let settlement = SimulatedSettlement::from_config(&config);
        assert_eq!(settlement.latency(), Duration::from_millis(10));
        assert_eq!(settlement.failure, FailureMode::Rate(0.25));
    }
}
