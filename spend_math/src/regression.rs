//! Least-squares trend fitting over an evenly spaced series
//!
//! The independent variable is the position of each value in the series
//! (0, 1, 2, ...), so the fitted slope is "change per step".

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Sums of squares below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-10;

/// Linear Regression fitted to a whole series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    values: Vec<f64>,
    slope: f64,
    intercept: f64,
    r_squared: f64,
}

impl LinearRegression {
    /// Fit `value ≈ slope * index + intercept` by ordinary least squares.
    ///
    /// Needs at least two points; a single point has no defined slope.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Linear regression needs at least 2 points, got {}",
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Value at index {} is not finite",
                pos
            )));
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        if denominator.abs() < DEGENERATE_EPSILON {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;
        let r_squared = coefficient_of_determination(values, y_mean, slope, intercept);

        Ok(Self {
            values: values.to_vec(),
            slope,
            intercept,
            r_squared,
        })
    }

    /// Change in value per step
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Fitted value at index 0
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination, clamped to `[0, 1]`.
    ///
    /// A constant series has no variance to explain and reports 0.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Fitted value at an arbitrary (possibly future) index
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// Fitted values over the training series
    pub fn fitted_values(&self) -> Vec<f64> {
        (0..self.values.len()).map(|i| self.predict(i)).collect()
    }

    /// Observed minus fitted, per training point
    pub fn residuals(&self) -> Vec<f64> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &y)| y - self.predict(i))
            .collect()
    }

    /// Number of points the line was fitted to
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a fitted model; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn coefficient_of_determination(values: &[f64], y_mean: f64, slope: f64, intercept: f64) -> f64 {
    let mut ss_total = 0.0;
    let mut ss_residual = 0.0;

    for (i, &y) in values.iter().enumerate() {
        let y_pred = slope * i as f64 + intercept;
        ss_total += (y - y_mean).powi(2);
        ss_residual += (y - y_pred).powi(2);
    }

    if ss_total.abs() < DEGENERATE_EPSILON {
        return 0.0;
    }

    (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
}
