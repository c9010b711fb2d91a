//! Raw transaction sources
//!
//! The expected CSV format is:
//! department_id,date,category,amount,transaction_id,expense_type
//! Treasury,2024-01-01,Personnel,10500.25,48213,payroll
//!
//! `category`, `transaction_id` and `expense_type` may be omitted entirely;
//! `amount` may be blank and is filled in by the preprocessor.
//!
//! Budget tracking rows use a separate file:
//! department_id,fiscal_year,quarter,allocated_budget,spent_amount,remaining_budget
//! Treasury,FY2024,Q1,250000,180000.50,69999.50

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 3] = ["department_id", "date", "amount"];
const BUDGET_COLUMNS: [&str; 6] = [
    "department_id",
    "fiscal_year",
    "quarter",
    "allocated_budget",
    "spent_amount",
    "remaining_budget",
];

fn check_columns(headers: &csv::StringRecord, required: &[&str], path: &Path) -> Result<()> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ForecastError::DataLoadError(format!(
                "Missing required column '{}' in {}",
                column,
                path.display()
            )));
        }
    }
    Ok(())
}

/// An uncleaned transaction row as it comes out of storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawTransaction {
    pub department_id: String,
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub expense_type: Option<String>,
}

/// Something that can hand back a department's raw transactions
pub trait TransactionSource {
    /// Rows for one department, in storage order
    fn load_department(&self, department_id: &str) -> Result<Vec<RawTransaction>>;
}

/// Reads transactions from a CSV file on every call
#[derive(Debug, Clone)]
pub struct CsvTransactionSource {
    path: PathBuf,
}

impl CsvTransactionSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row in the file regardless of department
    pub fn load_all(&self) -> Result<Vec<RawTransaction>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        check_columns(&headers, &REQUIRED_COLUMNS, &self.path)?;

        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<RawTransaction>, csv::Error>>()?;

        debug!(rows = rows.len(), path = %self.path.display(), "read transaction csv");
        Ok(rows)
    }
}

impl TransactionSource for CsvTransactionSource {
    fn load_department(&self, department_id: &str) -> Result<Vec<RawTransaction>> {
        let rows: Vec<RawTransaction> = self
            .load_all()?
            .into_iter()
            .filter(|row| row.department_id == department_id)
            .collect();

        info!(department_id, rows = rows.len(), "loaded department transactions");
        Ok(rows)
    }
}

/// Rows held in memory, mostly useful in tests and for generated data
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawTransaction>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawTransaction>) -> Self {
        Self { rows }
    }
}

impl TransactionSource for InMemorySource {
    fn load_department(&self, department_id: &str) -> Result<Vec<RawTransaction>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.department_id == department_id)
            .cloned()
            .collect())
    }
}

/// Write rows in the format [`CsvTransactionSource`] reads
pub fn write_csv<P: AsRef<Path>>(path: P, rows: &[RawTransaction]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Budget allocation and spend for one department and quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub department_id: String,
    pub fiscal_year: String,
    pub quarter: String,
    pub allocated_budget: f64,
    pub spent_amount: f64,
    pub remaining_budget: f64,
}

impl BudgetRecord {
    /// Fraction of the allocation already spent, `None` for a zero allocation
    pub fn utilization(&self) -> Option<f64> {
        if self.allocated_budget == 0.0 {
            None
        } else {
            Some(self.spent_amount / self.allocated_budget)
        }
    }
}

/// Budget rows for one fiscal year, in file order
pub fn load_budget_csv<P: AsRef<Path>>(path: P, fiscal_year: &str) -> Result<Vec<BudgetRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    check_columns(&headers, &BUDGET_COLUMNS, path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: BudgetRecord = row?;
        if row.fiscal_year == fiscal_year {
            rows.push(row);
        }
    }

    info!(fiscal_year, rows = rows.len(), "loaded budget data");
    Ok(rows)
}
