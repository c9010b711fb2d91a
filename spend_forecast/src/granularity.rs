//! Adaptive aggregation granularity
//!
//! The bucket width and forecast horizon are chosen from the number of whole
//! days a record set spans, by scanning an ordered table for the first row
//! whose bound admits the span.

use crate::error::{ForecastError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of an aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One hour
    Hourly,
    /// Six hours
    SixHourly,
    /// One calendar day
    Daily,
    /// Seven days
    Weekly,
}

impl Granularity {
    /// Length of one bucket
    pub fn width(&self) -> Duration {
        match self {
            Granularity::Hourly => Duration::hours(1),
            Granularity::SixHourly => Duration::hours(6),
            Granularity::Daily => Duration::days(1),
            Granularity::Weekly => Duration::weeks(1),
        }
    }

    /// Bucket length in whole seconds
    pub fn width_seconds(&self) -> i64 {
        self.width().num_seconds()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Granularity::Hourly => "1h",
            Granularity::SixHourly => "6h",
            Granularity::Daily => "1d",
            Granularity::Weekly => "1w",
        };
        write!(f, "{}", label)
    }
}

/// Bucket width plus the number of future buckets to forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularitySelection {
    pub granularity: Granularity,
    pub horizon: usize,
}

/// One row of the selection table.
///
/// `max_span_days: None` marks the catch-all final row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityRule {
    pub max_span_days: Option<i64>,
    pub granularity: Granularity,
    pub horizon: usize,
}

impl GranularityRule {
    fn selection(&self) -> GranularitySelection {
        GranularitySelection {
            granularity: self.granularity,
            horizon: self.horizon,
        }
    }
}

/// Ordered span thresholds; always ends in an unbounded row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GranularityRule>", into = "Vec<GranularityRule>")]
pub struct GranularityTable {
    bounded: Vec<(i64, GranularitySelection)>,
    fallback: GranularitySelection,
}

impl GranularityTable {
    /// Build a table from rows.
    ///
    /// Bounded rows must come first with strictly ascending bounds, exactly
    /// one unbounded row must come last, and every horizon must be positive.
    pub fn new(rules: Vec<GranularityRule>) -> Result<Self> {
        let (last, bounded_rules) = rules.split_last().ok_or_else(|| {
            ForecastError::InvalidParameter("Granularity table must not be empty".to_string())
        })?;

        if last.max_span_days.is_some() {
            return Err(ForecastError::InvalidParameter(
                "Last granularity rule must have no span bound".to_string(),
            ));
        }

        let mut bounded = Vec::with_capacity(bounded_rules.len());
        let mut previous: Option<i64> = None;
        for rule in bounded_rules {
            let bound = rule.max_span_days.ok_or_else(|| {
                ForecastError::InvalidParameter(
                    "Only the last granularity rule may be unbounded".to_string(),
                )
            })?;
            if bound < 0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "Span bound must be non-negative, got {}",
                    bound
                )));
            }
            if previous.is_some_and(|p| bound <= p) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Span bounds must be strictly ascending, {} follows {}",
                    bound,
                    previous.unwrap_or_default()
                )));
            }
            previous = Some(bound);
            bounded.push((bound, rule.selection()));
        }

        if let Some(rule) = rules.iter().find(|r| r.horizon == 0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon for {} buckets must be positive",
                rule.granularity
            )));
        }

        Ok(Self {
            bounded,
            fallback: last.selection(),
        })
    }

    /// Pick the first row whose bound admits `span_days`.
    ///
    /// A zero-day span (every record at the same instant) lands in the first row.
    pub fn select(&self, span_days: i64) -> GranularitySelection {
        self.bounded
            .iter()
            .find(|(max_days, _)| span_days <= *max_days)
            .map(|(_, selection)| *selection)
            .unwrap_or(self.fallback)
    }

    /// The rows of the table in scan order
    pub fn rules(&self) -> Vec<GranularityRule> {
        self.bounded
            .iter()
            .map(|(max_days, s)| GranularityRule {
                max_span_days: Some(*max_days),
                granularity: s.granularity,
                horizon: s.horizon,
            })
            .chain(std::iter::once(GranularityRule {
                max_span_days: None,
                granularity: self.fallback.granularity,
                horizon: self.fallback.horizon,
            }))
            .collect()
    }
}

impl Default for GranularityTable {
    fn default() -> Self {
        let row = |granularity, horizon| GranularitySelection {
            granularity,
            horizon,
        };
        Self {
            bounded: vec![
                (7, row(Granularity::Hourly, 168)),
                (30, row(Granularity::SixHourly, 120)),
                (90, row(Granularity::Daily, 90)),
            ],
            fallback: row(Granularity::Weekly, 52),
        }
    }
}

impl TryFrom<Vec<GranularityRule>> for GranularityTable {
    type Error = ForecastError;

    fn try_from(rules: Vec<GranularityRule>) -> Result<Self> {
        Self::new(rules)
    }
}

impl From<GranularityTable> for Vec<GranularityRule> {
    fn from(table: GranularityTable) -> Self {
        table.rules()
    }
}
