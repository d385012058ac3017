//! Error types for nano-runner.

use thiserror::Error;

/// Result type alias for nano-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nano-runner.
///
/// Scheduler-contract violations (empty batch, a prefill request with more
/// than one sequence, more than one storage block per sequence) are not
/// represented here: they are programmer errors enforced upstream and abort
/// the step via assertion.
#[derive(Error, Debug)]
pub enum Error {
    /// Tensor operation error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Model backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
