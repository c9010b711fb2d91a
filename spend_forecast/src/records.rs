//! Transaction records consumed by the engine

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single cleaned spending transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// When the spend happened (timezone-naive)
    pub timestamp: NaiveDateTime,
    /// Amount spent
    pub amount: f64,
    /// Optional category label, already normalized by the preprocessor
    pub category: Option<String>,
}

impl TransactionRecord {
    /// Create an uncategorized record
    pub fn new(timestamp: NaiveDateTime, amount: f64) -> Self {
        Self {
            timestamp,
            amount,
            category: None,
        }
    }

    /// Create a record carrying a category label
    pub fn with_category(timestamp: NaiveDateTime, amount: f64, category: impl Into<String>) -> Self {
        Self {
            timestamp,
            amount,
            category: Some(category.into()),
        }
    }
}

/// Earliest and latest timestamps of a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl RecordSpan {
    /// Elapsed time between the earliest and latest record
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whole days spanned, truncated toward zero
    pub fn whole_days(&self) -> i64 {
        self.duration().num_days()
    }
}

/// Reject an empty record set or any record whose amount is not a finite number.
///
/// Runs before any computation so a bad record fails the whole call instead of
/// silently dropping out of the totals.
pub fn validate_records(records: &[TransactionRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(ForecastError::EmptyInput);
    }

    for (index, record) in records.iter().enumerate() {
        if !record.amount.is_finite() {
            return Err(ForecastError::invalid_record(
                index,
                format!("amount {} is not a finite number", record.amount),
            ));
        }
    }

    Ok(())
}

/// Span of a validated, non-empty record set; order of the input does not matter
pub fn record_span(records: &[TransactionRecord]) -> Result<RecordSpan> {
    let start = records
        .iter()
        .map(|r| r.timestamp)
        .min()
        .ok_or(ForecastError::EmptyInput)?;
    let end = records
        .iter()
        .map(|r| r.timestamp)
        .max()
        .ok_or(ForecastError::EmptyInput)?;

    Ok(RecordSpan { start, end })
}

/// Inclusive calendar-date window used to narrow a department's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting one whose end precedes its start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ForecastError::InvalidParameter(format!(
                "Date window end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether a timestamp's calendar date falls inside the window
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }

    /// Records whose date falls inside the window, in input order
    pub fn filter(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        records
            .iter()
            .filter(|r| self.contains(r.timestamp))
            .cloned()
            .collect()
    }
}
