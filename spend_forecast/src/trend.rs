//! Linear trend over bucket indices

use crate::aggregation::BucketSeries;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use spend_math::statistics::mean;
use spend_math::LinearRegression;
use std::fmt;
use tracing::debug;

/// Direction of the fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a slope; anything within `tolerance` of zero is stable.
    ///
    /// With a tolerance of 0 only an exactly-zero slope is stable.
    pub fn from_slope(slope: f64, tolerance: f64) -> Self {
        if slope.abs() <= tolerance {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        write!(f, "{}", label)
    }
}

/// Least-squares fit of bucket total against bucket index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// Amount change per bucket
    pub slope: f64,
    /// Fitted value at bucket index 0
    pub intercept: f64,
    /// Coefficient of determination in `[0, 1]`
    pub goodness_of_fit: f64,
    pub direction: TrendDirection,
    /// Number of buckets the fit was computed over
    pub bucket_count: usize,
}

impl TrendFit {
    /// Fitted value at a bucket index, which may lie past the fitted range
    pub fn value_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// Fewer than two buckets: flat line through the mean, no fit quality
    pub fn is_degenerate(&self) -> bool {
        self.bucket_count < 2
    }

    /// The subset reported alongside the spending metrics
    pub fn summary(&self) -> TrendSummary {
        TrendSummary {
            slope: self.slope,
            goodness_of_fit: self.goodness_of_fit,
            direction: self.direction,
        }
    }
}

/// Trend figures exposed in the metrics output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub slope: f64,
    pub goodness_of_fit: f64,
    pub direction: TrendDirection,
}

/// Fit `total_amount ≈ slope * index + intercept` over every bucket,
/// zero-filled ones included.
pub fn fit_trend(series: &BucketSeries, stable_tolerance: f64) -> Result<TrendFit> {
    let totals = series.totals();

    let fit = if totals.len() < 2 {
        TrendFit {
            slope: 0.0,
            intercept: mean(&totals)?,
            goodness_of_fit: 0.0,
            direction: TrendDirection::Stable,
            bucket_count: totals.len(),
        }
    } else {
        let regression = LinearRegression::fit(&totals)?;
        TrendFit {
            slope: regression.slope(),
            intercept: regression.intercept(),
            goodness_of_fit: regression.r_squared(),
            direction: TrendDirection::from_slope(regression.slope(), stable_tolerance),
            bucket_count: totals.len(),
        }
    };

    debug!(
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.goodness_of_fit,
        direction = %fit.direction,
        buckets = fit.bucket_count,
        "fitted spending trend"
    );

    Ok(fit)
}
