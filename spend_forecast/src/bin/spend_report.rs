//! Department spending report: metrics and forecast as JSON, or sample data generation

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use spend_forecast::loader::{write_csv, CsvTransactionSource, TransactionSource};
use spend_forecast::preprocess::clean;
use spend_forecast::sample_data::generate_sample_transactions;
use spend_forecast::{DateWindow, EngineConfig, Result, SpendingEngine};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Spending metrics, trend and forecast for departmental transactions
#[derive(Parser, Debug)]
#[command(name = "spend_report", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute metrics and a forecast for one department
    Report {
        /// Transactions CSV file
        path: PathBuf,

        /// Department identifier to analyze
        department: String,

        /// Engine configuration as JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for the forecast noise
        #[arg(long)]
        seed: Option<u64>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Write synthetic transactions for every sample department
    GenerateSample {
        /// Output CSV file
        output: PathBuf,

        /// Seed for the generator
        #[arg(long)]
        seed: Option<u64>,

        /// Number of days of history, ending today
        #[arg(long, default_value_t = 365)]
        days: usize,
    },
}

fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| format!("bad date '{}': {}", text, e))
}

fn generate(output: &Path, seed: Option<u64>, days: usize) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = chrono::Local::now().date_naive() - chrono::Duration::days(days as i64);

    let rows = generate_sample_transactions(start, days, &mut rng)?;
    write_csv(output, &rows)?;
    info!(rows = rows.len(), path = %output.display(), "sample data generated");
    Ok(())
}

fn report(
    path: &Path,
    department: &str,
    config: Option<&Path>,
    seed: Option<u64>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let mut config = match config {
        Some(config_path) => EngineConfig::from_json_file(config_path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let engine = SpendingEngine::new(config)?;

    let raw = CsvTransactionSource::new(path).load_department(department)?;
    let mut records = clean(&raw)?.records;

    if from.is_some() || to.is_some() {
        let window = DateWindow::new(
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )?;
        records = window.filter(&records);
    }

    let mut rng = engine.default_rng();
    let report = engine.report(&records, &mut rng)?;
    info!(
        department,
        records = records.len(),
        granularity = %report.selection.granularity,
        "report computed"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Report {
            path,
            department,
            config,
            seed,
            from,
            to,
        } => report(&path, &department, config.as_deref(), seed, from, to),
        Command::GenerateSample { output, seed, days } => generate(&output, seed, days),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
