//! Error types for stock dashboard operations

use thiserror::Error;

/// Stock dashboard specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Data not available for the requested symbol(s)
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Chat-completion call failed
    #[error("LLM error: {0}")]
    LlmError(#[from] dashboard_llm::LLMError),

    /// Remote assistant answered with nothing usable
    #[error("Empty completion from {0}")]
    EmptyCompletion(String),

    /// Chart data could not be serialized
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
