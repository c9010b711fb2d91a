//! Cleaning of raw transaction rows into engine records
//!
//! Missing amounts become zero, exact duplicates are dropped, dates are
//! parsed and category labels are normalized. Anything that cannot be
//! repaired fails the whole batch.

use crate::error::{ForecastError, Result};
use crate::loader::RawTransaction;
use crate::records::TransactionRecord;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::warn;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cleaned records plus counts of the repairs applied
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTransactions {
    pub records: Vec<TransactionRecord>,
    pub filled_amounts: usize,
    pub duplicates_removed: usize,
}

/// Parse a timestamp, accepting a bare date as midnight
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Trim and lowercase a label; blank labels become `None`
pub fn normalize_category(label: Option<&str>) -> Option<String> {
    label
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
}

/// Clean raw rows, preserving their order.
///
/// The index in an [`ForecastError::InvalidRecord`] refers to the raw row.
pub fn clean(raw: &[RawTransaction]) -> Result<CleanedTransactions> {
    let mut records = Vec::with_capacity(raw.len());
    let mut seen = HashSet::with_capacity(raw.len());
    let mut filled_amounts = 0;
    let mut duplicates_removed = 0;

    for (index, row) in raw.iter().enumerate() {
        let timestamp = parse_timestamp(&row.date).ok_or_else(|| {
            ForecastError::invalid_record(index, format!("unparseable date '{}'", row.date))
        })?;

        let amount = match row.amount.as_deref().map(str::trim) {
            None | Some("") => {
                filled_amounts += 1;
                0.0
            }
            Some(text) => {
                let value = text.parse::<f64>().map_err(|_| {
                    ForecastError::invalid_record(index, format!("non-numeric amount '{}'", text))
                })?;
                if !value.is_finite() {
                    return Err(ForecastError::invalid_record(
                        index,
                        format!("amount '{}' is not finite", text),
                    ));
                }
                value
            }
        };

        let key = (
            row.department_id.clone(),
            timestamp,
            row.category.clone(),
            amount.to_bits(),
            row.transaction_id.clone(),
            row.expense_type.clone(),
        );
        if !seen.insert(key) {
            duplicates_removed += 1;
            continue;
        }

        records.push(TransactionRecord {
            timestamp,
            amount,
            category: normalize_category(row.category.as_deref()),
        });
    }

    if filled_amounts > 0 {
        warn!(filled_amounts, "missing amounts replaced with zero");
    }
    if duplicates_removed > 0 {
        warn!(duplicates_removed, "duplicate transactions dropped");
    }

    Ok(CleanedTransactions {
        records,
        filled_amounts,
        duplicates_removed,
    })
}
