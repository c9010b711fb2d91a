//! # Spend Math
//!
//! Numeric building blocks for spending analysis.
//! This crate provides an ordinary least-squares trend fit over an evenly
//! spaced series and the descriptive statistics the forecast engine needs.

use thiserror::Error;

pub mod regression;
pub mod statistics;

pub use regression::LinearRegression;

/// Errors that can occur in spending-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for spending math operations
pub type Result<T> = std::result::Result<T, MathError>;
