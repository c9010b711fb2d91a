//! Summary spending metrics

use crate::aggregation::{average_monthly_spend, spending_by_category, total_spend};
use crate::error::Result;
use crate::records::TransactionRecord;
use crate::trend::{TrendFit, TrendSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Spending metrics for one record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingMetrics {
    /// Sum of every raw record amount
    pub total_spend: f64,
    /// Mean calendar-day spend scaled to a month
    pub average_monthly_spend: f64,
    /// Spend per category, when categories are present
    pub spending_by_category: Option<BTreeMap<String, f64>>,
    pub trend: TrendSummary,
}

/// Derive metrics from the raw records and an already-computed trend fit
pub fn spending_metrics(
    records: &[TransactionRecord],
    fit: &TrendFit,
    days_per_month: f64,
) -> Result<SpendingMetrics> {
    Ok(SpendingMetrics {
        total_spend: total_spend(records)?,
        average_monthly_spend: average_monthly_spend(records, days_per_month)?,
        spending_by_category: spending_by_category(records),
        trend: fit.summary(),
    })
}

impl fmt::Display for SpendingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spending Metrics:")?;
        writeln!(f, "  Total spend:      {:.2}", self.total_spend)?;
        writeln!(f, "  Monthly average:  {:.2}", self.average_monthly_spend)?;
        writeln!(
            f,
            "  Trend:            {} (slope {:.4}, R² {:.4})",
            self.trend.direction, self.trend.slope, self.trend.goodness_of_fit
        )?;
        if let Some(categories) = &self.spending_by_category {
            writeln!(f, "  By category:")?;
            for (category, amount) in categories {
                writeln!(f, "    {:<16} {:.2}", category, amount)?;
            }
        }
        Ok(())
    }
}
