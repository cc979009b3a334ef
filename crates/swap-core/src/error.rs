//! Error Types for the Swap Core

use thiserror::Error;

use crate::model::ValidationResult;

pub type Result<T> = std::result::Result<T, SwapError>;

/// Failure to fetch or parse the price catalog
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Price source responded with HTTP {0}")]
    Status(u16),

    #[error("Malformed price payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Price source unavailable: {0}")]
    Source(String),
}

impl LoadError {
    /// Every load failure can be retried by triggering another load.
    pub fn is_retryable(&self) -> bool {
        true
    }

    pub fn user_message(&self) -> &'static str {
        "Failed to load token prices. Please try again."
    }
}

/// Failure reported by a settlement backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Swap rejected: {0}")]
    Rejected(String),

    #[error("Settlement unavailable: {0}")]
    Unavailable(String),
}

impl ExecutionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecutionError::Unavailable(_))
    }

    pub fn user_message(&self) -> &'static str {
        "Swap failed. Please try again."
    }
}

/// An asset icon could not be fetched; recovered with a glyph fallback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Icon unavailable for {symbol}")]
pub struct IconLoadError {
    pub symbol: String,
}

impl IconLoadError {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into() }
    }
}

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Catalog load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Swap form is invalid")]
    Invalid(ValidationResult),

    #[error("A swap is already being submitted")]
    SubmissionInFlight,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SwapError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SwapError::Load(e) => e.is_retryable(),
            SwapError::Execution(e) => e.is_retryable(),
            SwapError::SubmissionInFlight => true,
            SwapError::Invalid(_) | SwapError::Config(_) => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            SwapError::Load(e) => e.user_message().into(),
            SwapError::Execution(e) => e.user_message().into(),
            SwapError::Invalid(_) => "Please fix the highlighted fields.".into(),
            SwapError::SubmissionInFlight => "A swap is already in progress.".into(),
            SwapError::Config(_) => "Service configuration error.".into(),
        }
    }
}
