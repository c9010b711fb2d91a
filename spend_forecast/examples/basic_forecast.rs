use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spend_forecast::loader::{InMemorySource, TransactionSource};
use spend_forecast::preprocess::clean;
use spend_forecast::sample_data::generate_sample_transactions;
use spend_forecast::{EngineConfig, Result, SpendingEngine};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let mut rng = StdRng::seed_from_u64(2024);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let source = InMemorySource::new(generate_sample_transactions(start, 120, &mut rng)?);

    let engine = SpendingEngine::new(EngineConfig::default().with_seed(7))?;

    for department in ["Treasury", "Health"] {
        let records = clean(&source.load_department(department)?)?.records;

        let metrics = engine.metrics(&records)?;
        let forecast = engine.forecast(&records)?;

        println!("== {} ==", department);
        println!("{}", metrics);
        println!(
            "Forecast: {} buckets of {}, first {:.2}, last {:.2}",
            forecast.horizon(),
            forecast.granularity(),
            forecast.values().first().copied().unwrap_or_default(),
            forecast.values().last().copied().unwrap_or_default(),
        );
    }

    Ok(())
}
