//! Forecast generation: trend extrapolation with volatility-scaled noise
//!
//! Randomness is always supplied by the caller as an `Rng`, so a seeded
//! generator makes the whole series reproducible.

use crate::aggregation::BucketSeries;
use crate::error::{ForecastError, Result};
use crate::granularity::Granularity;
use crate::trend::TrendFit;
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use spend_math::statistics::sample_std_dev;
use tracing::debug;

/// One forecast bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period_start: NaiveDateTime,
    /// Never negative
    pub predicted_amount: f64,
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    granularity: Granularity,
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Bucket width the forecast continues
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Forecast points in chronological order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_amount).collect()
    }

    /// Get the future bucket starts
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| p.period_start).collect()
    }

    /// Number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.points.len()
    }
}

/// Standard deviation of the historical bucket totals
pub fn historical_volatility(series: &BucketSeries) -> f64 {
    sample_std_dev(&series.totals())
}

/// Start times of `horizon` buckets following the series
pub fn future_period_starts(series: &BucketSeries, horizon: usize) -> Result<Vec<NaiveDateTime>> {
    let first = series.next_period_start().ok_or(ForecastError::EmptyInput)?;
    let width = series.granularity().width_seconds();

    Ok((0..horizon)
        .map(|k| first + Duration::seconds(width * k as i64))
        .collect())
}

/// Extrapolate `fit` over `horizon` buckets past the end of `series`.
///
/// Each point is `slope * i + intercept` for the continuing bucket index `i`,
/// plus independent `N(0, noise_fraction * volatility)` noise, clamped at zero.
/// A degenerate fit repeats its single average with no noise.
pub fn generate_forecast<R: Rng + ?Sized>(
    series: &BucketSeries,
    fit: &TrendFit,
    horizon: usize,
    noise_fraction: f64,
    rng: &mut R,
) -> Result<ForecastSeries> {
    if !(0.0..=1.0).contains(&noise_fraction) {
        return Err(ForecastError::InvalidParameter(format!(
            "Noise fraction must be between 0 and 1, got {}",
            noise_fraction
        )));
    }

    let period_starts = future_period_starts(series, horizon)?;

    let values: Vec<f64> = if fit.is_degenerate() {
        vec![fit.intercept.max(0.0); horizon]
    } else {
        let volatility = historical_volatility(series);
        let noise_std = noise_fraction * volatility;
        debug!(volatility, noise_std, horizon, "generating forecast");

        let noise = if noise_std > 0.0 {
            Some(Normal::new(0.0, noise_std).map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid noise distribution: {}", e))
            })?)
        } else {
            None
        };

        (0..horizon)
            .map(|k| {
                let base = fit.value_at(fit.bucket_count + k);
                let jitter = noise.as_ref().map_or(0.0, |n| n.sample(&mut *rng));
                (base + jitter).max(0.0)
            })
            .collect()
    };

    let points = period_starts
        .into_iter()
        .zip(values)
        .map(|(period_start, predicted_amount)| ForecastPoint {
            period_start,
            predicted_amount,
        })
        .collect();

    Ok(ForecastSeries {
        granularity: series.granularity(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::records::TransactionRecord;
    use crate::trend::fit_trend;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(n: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(n)
    }

    fn daily_series(amounts: &[f64]) -> BucketSeries {
        let records: Vec<TransactionRecord> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| TransactionRecord::new(day(i as i64), a))
            .collect();
        aggregate(&records, Granularity::Daily).unwrap()
    }

    #[test]
    fn test_noise_free_extrapolation() {
        let series = daily_series(&[10.0, 20.0, 30.0]);
        let fit = fit_trend(&series, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let forecast = generate_forecast(&series, &fit, 3, 0.0, &mut rng).unwrap();

        let values = forecast.values();
        assert_relative_eq!(values[0], 40.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 50.0, epsilon = 1e-9);
        assert_relative_eq!(values[2], 60.0, epsilon = 1e-9);
        assert_eq!(forecast.timestamps(), vec![day(3), day(4), day(5)]);
    }

    #[test]
    fn test_declining_trend_clamps_at_zero() {
        let series = daily_series(&[100.0, 60.0, 20.0]);
        let fit = fit_trend(&series, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let forecast = generate_forecast(&series, &fit, 10, 0.1, &mut rng).unwrap();

        assert_eq!(forecast.horizon(), 10);
        assert!(forecast.values().iter().all(|v| *v >= 0.0));
        assert_eq!(forecast.values()[9], 0.0);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let series = daily_series(&[5.0, 40.0, 12.0, 33.0, 18.0]);
        let fit = fit_trend(&series, 0.0).unwrap();

        let a = generate_forecast(&series, &fit, 20, 0.1, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_forecast(&series, &fit, 20, 0.1, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = generate_forecast(&series, &fit, 20, 0.1, &mut StdRng::seed_from_u64(43)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.values(), c.values());
    }

    #[test]
    fn test_noise_scale_follows_volatility() {
        let history: Vec<f64> = (0..120)
            .map(|i| if i % 2 == 0 { 1300.0 } else { 700.0 })
            .collect();
        let series = daily_series(&history);
        let fit = fit_trend(&series, 0.0).unwrap();
        let horizon = 2000;

        let forecast =
            generate_forecast(&series, &fit, horizon, 0.1, &mut StdRng::seed_from_u64(1)).unwrap();

        let deviations: Vec<f64> = forecast
            .values()
            .iter()
            .enumerate()
            .map(|(k, v)| v - fit.value_at(fit.bucket_count + k))
            .collect();
        let expected_std = 0.1 * historical_volatility(&series);

        assert_relative_eq!(expected_std, 30.0, max_relative = 0.02);
        assert_relative_eq!(sample_std_dev(&deviations), expected_std, max_relative = 0.1);
        assert!(spend_math::statistics::mean(&deviations).unwrap().abs() < 0.2 * expected_std);
    }

    #[test]
    fn test_degenerate_fit_is_flat_without_noise() {
        let series = daily_series(&[64.0]);
        let fit = fit_trend(&series, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let forecast = generate_forecast(&series, &fit, 5, 0.1, &mut rng).unwrap();
        assert_eq!(forecast.values(), vec![64.0; 5]);
        assert_eq!(forecast.points()[0].period_start, day(1));
    }

    #[test]
    fn test_rejects_bad_noise_fraction() {
        let series = daily_series(&[1.0, 2.0]);
        let fit = fit_trend(&series, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            generate_forecast(&series, &fit, 5, -0.5, &mut rng),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
