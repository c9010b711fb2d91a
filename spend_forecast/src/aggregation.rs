//! Aggregation of transactions into fixed-width time buckets
//!
//! Buckets are anchored at the earliest record, not at a calendar boundary,
//! and every interval between the first and last record is materialized
//! (empty ones with a zero total) so bucket indices stay evenly spaced.

use crate::error::Result;
use crate::granularity::Granularity;
use crate::records::{record_span, validate_records, TransactionRecord};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use spend_math::statistics::compensated_sum;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Total spend inside one `[period_start, period_start + width)` interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub period_start: NaiveDateTime,
    pub total_amount: f64,
}

/// Contiguous, chronologically ordered buckets at a single granularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSeries {
    granularity: Granularity,
    buckets: Vec<Bucket>,
}

impl BucketSeries {
    /// Width used for every bucket in the series
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The buckets, earliest first
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Bucket totals in index order
    pub fn totals(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.total_amount).collect()
    }

    /// Sum of all bucket totals
    pub fn total(&self) -> f64 {
        compensated_sum(self.buckets.iter().map(|b| b.total_amount))
    }

    /// Start of the first bucket after the series
    pub fn next_period_start(&self) -> Option<NaiveDateTime> {
        self.buckets
            .last()
            .map(|b| b.period_start + self.granularity.width())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Group records into buckets of the given width.
///
/// Input order does not matter. The number of buckets is
/// `ceil(span / width) + 1`, so a zero-length span yields a single bucket and
/// a span that is not a whole number of widths ends with an empty bucket.
pub fn aggregate(records: &[TransactionRecord], granularity: Granularity) -> Result<BucketSeries> {
    validate_records(records)?;
    let span = record_span(records)?;

    let width = granularity.width_seconds();
    let span_seconds = span.duration().num_seconds();
    let bucket_count = ((span_seconds + width - 1) / width) as usize + 1;

    let mut totals = vec![0.0; bucket_count];
    for record in records {
        let index = ((record.timestamp - span.start).num_seconds() / width) as usize;
        totals[index] += record.amount;
    }

    let buckets: Vec<Bucket> = totals
        .into_iter()
        .enumerate()
        .map(|(i, total_amount)| Bucket {
            period_start: span.start + Duration::seconds(width * i as i64),
            total_amount,
        })
        .collect();

    debug!(
        granularity = %granularity,
        bucket_count = buckets.len(),
        records = records.len(),
        "aggregated transactions into buckets"
    );
    for bucket in &buckets {
        trace!(period_start = %bucket.period_start, total = bucket.total_amount, "bucket");
    }

    Ok(BucketSeries {
        granularity,
        buckets,
    })
}

/// Sum of every record amount, independent of any bucketing
pub fn total_spend(records: &[TransactionRecord]) -> Result<f64> {
    validate_records(records)?;
    Ok(compensated_sum(records.iter().map(|r| r.amount)))
}

/// Per-calendar-day totals covering every date from the first to the last record
pub fn daily_totals(records: &[TransactionRecord]) -> Result<BTreeMap<NaiveDate, f64>> {
    validate_records(records)?;
    let span = record_span(records)?;

    let mut days: BTreeMap<NaiveDate, f64> = span
        .start
        .date()
        .iter_days()
        .take_while(|d| *d <= span.end.date())
        .map(|d| (d, 0.0))
        .collect();

    for record in records {
        *days.entry(record.timestamp.date()).or_insert(0.0) += record.amount;
    }

    Ok(days)
}

/// Mean daily spend over the calendar days covered, scaled to a month.
///
/// Anchored to calendar days rather than the adaptive bucket width so the
/// figure does not move when the engine picks a different granularity.
pub fn average_monthly_spend(records: &[TransactionRecord], days_per_month: f64) -> Result<f64> {
    let days = daily_totals(records)?;
    let mean_daily = compensated_sum(days.values().copied()) / days.len() as f64;
    Ok(mean_daily * days_per_month)
}

/// Spend per category label, or `None` when no record carries a category.
///
/// Uncategorized records are left out of the breakdown.
pub fn spending_by_category(records: &[TransactionRecord]) -> Option<BTreeMap<String, f64>> {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if let Some(category) = &record.category {
            *by_category.entry(category.clone()).or_insert(0.0) += record.amount;
        }
    }

    if by_category.is_empty() {
        None
    } else {
        Some(by_category)
    }
}
