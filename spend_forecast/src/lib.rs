//! # Spend Forecast
//!
//! Spending metrics, trend estimation and short-horizon forecasting for a
//! department's dated transactions.
//!
//! ## Pipeline
//!
//! 1. The span of the record set picks an aggregation [`Granularity`] and a
//!    forecast horizon from an ordered threshold table:
//!
//! | span (days) | bucket width | horizon |
//! |-------------|--------------|---------|
//! | ≤ 7         | 1 hour       | 168     |
//! | 8–30        | 6 hours      | 120     |
//! | 31–90       | 1 day        | 90      |
//! | > 90        | 1 week       | 52      |
//!
//! 2. Records are summed into contiguous buckets anchored at the earliest
//!    record; empty buckets are kept with a zero total.
//! 3. A least-squares line is fitted over bucket index.
//! 4. The line is extrapolated over the horizon with noise scaled to the
//!    historical volatility and clamped at zero.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spend_forecast::loader::{CsvTransactionSource, TransactionSource};
//! use spend_forecast::preprocess::clean;
//! use spend_forecast::{EngineConfig, SpendingEngine};
//!
//! let source = CsvTransactionSource::new("government_spending.csv");
//! let raw = source.load_department("Treasury")?;
//! let records = clean(&raw)?.records;
//!
//! let engine = SpendingEngine::new(EngineConfig::default().with_seed(42))?;
//! let metrics = engine.metrics(&records)?;
//! let forecast = engine.forecast(&records)?;
//! println!("{}", metrics);
//! println!("{} points at {}", forecast.horizon(), forecast.granularity());
//! # Ok::<(), spend_forecast::ForecastError>(())
//! ```

pub mod aggregation;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod granularity;
pub mod loader;
pub mod metrics;
pub mod preprocess;
pub mod records;
pub mod sample_data;
pub mod trend;

// Re-export commonly used types
pub use crate::aggregation::{Bucket, BucketSeries};
pub use crate::config::EngineConfig;
pub use crate::engine::{SpendingEngine, SpendingReport};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{ForecastPoint, ForecastSeries};
pub use crate::granularity::{Granularity, GranularitySelection, GranularityTable};
pub use crate::metrics::SpendingMetrics;
pub use crate::records::{DateWindow, TransactionRecord};
pub use crate::trend::{TrendDirection, TrendFit};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
