use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;
use spend_forecast::aggregation::aggregate;
use spend_forecast::{
    EngineConfig, ForecastError, Granularity, SpendingEngine, TransactionRecord, TrendDirection,
};

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn engine() -> SpendingEngine {
    SpendingEngine::new(EngineConfig::default()).unwrap()
}

/// Ten alternating spend/no-spend records, two a day, over four and a half days
fn sparse_scenario() -> Vec<TransactionRecord> {
    [100.0, 0.0, 50.0, 0.0, 200.0, 0.0, 150.0, 0.0, 300.0, 0.0]
        .iter()
        .enumerate()
        .map(|(i, &amount)| TransactionRecord::new(origin() + Duration::hours(12 * i as i64), amount))
        .collect()
}

fn daily_constant(days: i64, amount: f64) -> Vec<TransactionRecord> {
    (0..days)
        .map(|d| TransactionRecord::new(origin() + Duration::days(d), amount))
        .collect()
}

#[test]
fn test_sparse_short_span_scenario() {
    let records = sparse_scenario();
    let engine = engine();

    let analysis = engine.analyze_trend(&records).unwrap();
    assert_eq!(analysis.selection.granularity, Granularity::Hourly);
    assert_eq!(analysis.selection.horizon, 168);
    // 108 hours between first and last record
    assert_eq!(analysis.buckets.len(), 109);

    let metrics = engine.metrics(&records).unwrap();
    assert_relative_eq!(metrics.total_spend, 800.0);
    assert!(metrics.trend.slope > 0.0);
    assert_eq!(metrics.trend.direction, TrendDirection::Increasing);
    assert!(metrics.spending_by_category.is_none());

    let forecast = engine
        .forecast_with_rng(&records, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(forecast.horizon(), 168);
    assert_eq!(forecast.points()[0].period_start, origin() + Duration::hours(109));
}

#[test]
fn test_constant_daily_spend_is_stable() {
    // 90 days spans 89 days and lands on daily buckets
    let records = daily_constant(90, 50.0);
    let engine = engine();

    let metrics = engine.metrics(&records).unwrap();
    assert_eq!(metrics.trend.slope, 0.0);
    assert_eq!(metrics.trend.goodness_of_fit, 0.0);
    assert_eq!(metrics.trend.direction, TrendDirection::Stable);
    assert_relative_eq!(metrics.average_monthly_spend, 50.0 * 30.44, epsilon = 1e-9);

    let forecast = engine
        .forecast_with_rng(&records, &mut StdRng::seed_from_u64(8))
        .unwrap();
    assert_eq!(forecast.granularity(), Granularity::Daily);
    assert_eq!(forecast.horizon(), 90);
    for value in forecast.values() {
        assert_relative_eq!(value, 50.0, epsilon = 1e-9);
    }
}

#[test]
fn test_constant_spend_over_whole_weeks() {
    // one 350 payment a week for 15 weeks, a 98 day span
    let records: Vec<TransactionRecord> = (0..15)
        .map(|w| TransactionRecord::new(origin() + Duration::weeks(w), 350.0))
        .collect();
    let report = engine()
        .report(&records, &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(report.selection.granularity, Granularity::Weekly);
    assert_eq!(report.metrics.trend.direction, TrendDirection::Stable);
    assert_eq!(report.forecast.horizon(), 52);
    assert_eq!(report.forecast.points()[0].period_start, origin() + Duration::weeks(15));
    assert!(report.forecast.values().iter().all(|v| (*v - 350.0).abs() < 1e-9));
}

#[test]
fn test_daily_spend_with_partial_final_week() {
    // 105 days spans 104, so the last of 16 weekly buckets is empty
    let records = daily_constant(105, 50.0);
    let analysis = engine().analyze_trend(&records).unwrap();

    assert_eq!(analysis.selection.granularity, Granularity::Weekly);
    assert_eq!(analysis.buckets.len(), 16);
    assert_eq!(analysis.buckets.totals()[14], 350.0);
    assert_eq!(analysis.buckets.totals()[15], 0.0);
    assert_relative_eq!(analysis.buckets.total(), 105.0 * 50.0);
}

#[test]
fn test_single_record() {
    let records = vec![TransactionRecord::new(origin(), 125.0)];
    let engine = engine();

    let metrics = engine.metrics(&records).unwrap();
    assert_eq!(metrics.trend.slope, 0.0);
    assert_eq!(metrics.trend.direction, TrendDirection::Stable);
    assert_eq!(metrics.total_spend, 125.0);

    let forecast = engine.forecast(&records).unwrap();
    assert_eq!(forecast.horizon(), 168);
    assert_eq!(forecast.values(), vec![125.0; 168]);
}

#[test]
fn test_zero_day_span() {
    let at = origin() + Duration::hours(9);
    let records = vec![
        TransactionRecord::new(at, 10.0),
        TransactionRecord::new(at, 15.0),
        TransactionRecord::new(at, 0.0),
    ];

    let analysis = engine().analyze_trend(&records).unwrap();
    assert_eq!(analysis.selection.granularity, Granularity::Hourly);
    assert_eq!(analysis.buckets.len(), 1);
    assert_eq!(analysis.buckets.totals(), vec![25.0]);
    assert!(analysis.fit.is_degenerate());
}

#[rstest]
#[case(Granularity::Hourly)]
#[case(Granularity::SixHourly)]
#[case(Granularity::Daily)]
#[case(Granularity::Weekly)]
fn test_total_is_conserved_by_bucketing(#[case] granularity: Granularity) {
    let records: Vec<TransactionRecord> = (0..400)
        .map(|i| {
            TransactionRecord::new(
                origin() + Duration::minutes(97 * i),
                (i % 13) as f64 * 3.7 + 0.01,
            )
        })
        .collect();

    let total = spend_forecast::aggregation::total_spend(&records).unwrap();
    let series = aggregate(&records, granularity).unwrap();

    assert_relative_eq!(series.total(), total, epsilon = 1e-6);
}

#[rstest]
#[case(Granularity::Hourly, 10)]
#[case(Granularity::SixHourly, 20)]
#[case(Granularity::Daily, 30)]
fn test_bucket_count_has_no_gaps(#[case] granularity: Granularity, #[case] span_buckets: i64) {
    let width = granularity.width();
    // first and last bucket populated, everything between empty
    let records = vec![
        TransactionRecord::new(origin(), 1.0),
        TransactionRecord::new(origin() + width * span_buckets as i32, 2.0),
    ];

    let series = aggregate(&records, granularity).unwrap();
    assert_eq!(series.len(), span_buckets as usize + 1);
    assert_eq!(series.totals().iter().filter(|t| **t == 0.0).count(), span_buckets as usize - 1);
    for pair in series.buckets().windows(2) {
        assert_eq!(pair[1].period_start - pair[0].period_start, width);
    }
}

#[rstest]
#[case(Granularity::Hourly, Duration::minutes(150), 4)]
#[case(Granularity::SixHourly, Duration::hours(13), 4)]
#[case(Granularity::Daily, Duration::hours(36), 3)]
#[case(Granularity::Weekly, Duration::days(8), 3)]
fn test_bucket_count_rounds_partial_width_up(
    #[case] granularity: Granularity,
    #[case] span: Duration,
    #[case] expected: usize,
) {
    let records = vec![
        TransactionRecord::new(origin(), 1.0),
        TransactionRecord::new(origin() + span, 2.0),
    ];

    let series = aggregate(&records, granularity).unwrap();
    assert_eq!(series.len(), expected);
    assert_eq!(series.buckets().last().unwrap().total_amount, 0.0);
    assert_eq!(series.total(), 3.0);
}

#[test]
fn test_forecast_never_negative() {
    // steep decline with heavy volatility
    let records: Vec<TransactionRecord> = (0..60)
        .map(|d| {
            let base = 6000.0 - 100.0 * d as f64;
            let swing = if d % 2 == 0 { 2500.0 } else { -2500.0 };
            TransactionRecord::new(origin() + Duration::days(d), (base + swing).max(0.0))
        })
        .collect();
    let engine = SpendingEngine::new(EngineConfig::default().with_noise_fraction(1.0)).unwrap();

    for seed in 0..20 {
        let forecast = engine
            .forecast_with_rng(&records, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        assert!(forecast.values().iter().all(|v| *v >= 0.0));
    }
}

#[test]
fn test_metrics_are_idempotent() {
    let records = sparse_scenario();
    let engine = engine();

    let first = engine.metrics(&records).unwrap();
    let second = engine.metrics(&records).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_seeded_forecast_is_reproducible() {
    let records = sparse_scenario();

    let seeded = SpendingEngine::new(EngineConfig::default().with_seed(99)).unwrap();
    let a = seeded.forecast(&records).unwrap();
    let b = seeded.forecast(&records).unwrap();
    assert_eq!(a, b);

    let c = engine()
        .forecast_with_rng(&records, &mut StdRng::seed_from_u64(99))
        .unwrap();
    assert_eq!(a, c);
}

#[test]
fn test_unsorted_input_matches_sorted() {
    let sorted = sparse_scenario();
    let mut shuffled = sorted.clone();
    shuffled.reverse();
    shuffled.swap(2, 7);

    let engine = engine();
    assert_eq!(engine.metrics(&sorted).unwrap(), engine.metrics(&shuffled).unwrap());
}

#[test]
fn test_stable_tolerance() {
    // a tiny upward drift
    let records: Vec<TransactionRecord> = (0..40)
        .map(|d| TransactionRecord::new(origin() + Duration::days(d), 100.0 + 1e-6 * d as f64))
        .collect();

    let exact = engine().metrics(&records).unwrap();
    assert_eq!(exact.trend.direction, TrendDirection::Increasing);

    let tolerant = SpendingEngine::new(EngineConfig::default().with_stable_slope_tolerance(1e-3))
        .unwrap()
        .metrics(&records)
        .unwrap();
    assert_eq!(tolerant.trend.direction, TrendDirection::Stable);
}

#[test]
fn test_errors_surface_to_caller() {
    let engine = engine();

    assert!(matches!(engine.metrics(&[]), Err(ForecastError::EmptyInput)));
    assert!(matches!(engine.forecast(&[]), Err(ForecastError::EmptyInput)));

    let records = vec![
        TransactionRecord::new(origin(), 1.0),
        TransactionRecord::new(origin(), f64::NAN),
    ];
    assert!(matches!(
        engine.metrics(&records),
        Err(ForecastError::InvalidRecord { index: 1, .. })
    ));
}

#[test]
fn test_invalid_config_rejected() {
    assert!(matches!(
        SpendingEngine::new(EngineConfig::default().with_noise_fraction(2.0)),
        Err(ForecastError::InvalidParameter(_))
    ));
}
