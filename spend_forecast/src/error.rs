//! Error types for the spend_forecast crate

use spend_math::MathError;
use thiserror::Error;

/// Custom error types for the spend_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The record set has no rows, so nothing can be computed
    #[error("Empty input: no transaction records supplied")]
    EmptyInput,

    /// A record failed validation; the whole call is rejected
    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised while loading raw transactions
    #[error("Data load error: {0}")]
    DataLoadError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Shorthand for an [`ForecastError::InvalidRecord`]
    pub fn invalid_record(index: usize, reason: impl Into<String>) -> Self {
        ForecastError::InvalidRecord {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
