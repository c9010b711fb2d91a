//! # Spendsight
//!
//! Facade over the Spendsight workspace: departmental spending metrics,
//! adaptive-granularity trend fitting and short-horizon forecasting.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use spendsight_workspace::forecast::{EngineConfig, SpendingEngine, TransactionRecord};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let records = vec![
//!     TransactionRecord::new(day(1), 100.0),
//!     TransactionRecord::new(day(2), 150.0),
//!     TransactionRecord::new(day(3), 200.0),
//! ];
//!
//! let engine = SpendingEngine::new(EngineConfig::default().with_seed(1)).unwrap();
//! let metrics = engine.metrics(&records).unwrap();
//! assert_eq!(metrics.total_spend, 450.0);
//! ```

pub use spend_forecast as forecast;
pub use spend_math as math;
