//! Engine configuration

use crate::error::{ForecastError, Result};
use crate::granularity::GranularityTable;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fraction of historical volatility used as the forecast noise std-dev
pub const DEFAULT_NOISE_FRACTION: f64 = 0.1;

/// Average Gregorian month length used to scale daily spend
pub const DEFAULT_DAYS_PER_MONTH: f64 = 30.44;

/// Tunables for the spending engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Span thresholds mapping to bucket width and horizon
    pub granularity_table: GranularityTable,
    /// Noise std-dev as a fraction of historical volatility, in `[0, 1]`
    pub noise_fraction: f64,
    /// Days per month for the monthly-average figure
    pub days_per_month: f64,
    /// Slopes with magnitude at or below this read as "stable"
    pub stable_slope_tolerance: f64,
    /// Fixed seed for the forecast noise; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            granularity_table: GranularityTable::default(),
            noise_fraction: DEFAULT_NOISE_FRACTION,
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            stable_slope_tolerance: 0.0,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the noise fraction
    pub fn with_noise_fraction(mut self, noise_fraction: f64) -> Self {
        self.noise_fraction = noise_fraction;
        self
    }

    /// Set the month length used for the monthly average
    pub fn with_days_per_month(mut self, days_per_month: f64) -> Self {
        self.days_per_month = days_per_month;
        self
    }

    /// Set the stable-slope tolerance
    pub fn with_stable_slope_tolerance(mut self, tolerance: f64) -> Self {
        self.stable_slope_tolerance = tolerance;
        self
    }

    /// Pin the forecast noise to a seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the granularity table
    pub fn with_granularity_table(mut self, table: GranularityTable) -> Self {
        self.granularity_table = table;
        self
    }

    /// Check every numeric parameter is in range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.noise_fraction) {
            return Err(ForecastError::InvalidParameter(format!(
                "noise_fraction must be between 0 and 1, got {}",
                self.noise_fraction
            )));
        }
        if !(self.days_per_month.is_finite() && self.days_per_month > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "days_per_month must be positive, got {}",
                self.days_per_month
            )));
        }
        if !(self.stable_slope_tolerance.is_finite() && self.stable_slope_tolerance >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "stable_slope_tolerance must be non-negative, got {}",
                self.stable_slope_tolerance
            )));
        }
        Ok(())
    }
}
