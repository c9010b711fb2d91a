//! The spending engine: selection, aggregation, fit, metrics and forecast
//!
//! The engine holds only immutable configuration. Every call re-derives the
//! granularity, buckets and trend from the records it is handed, so separate
//! calls share no state and can run on different threads.

use crate::aggregation::{aggregate, BucketSeries};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::forecast::{generate_forecast, ForecastSeries};
use crate::granularity::GranularitySelection;
use crate::metrics::{spending_metrics, SpendingMetrics};
use crate::records::{record_span, validate_records, TransactionRecord};
use crate::trend::{fit_trend, TrendFit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Intermediate products shared by the metrics and the forecast
#[derive(Debug, Clone, PartialEq)]
pub struct TrendAnalysis {
    pub selection: GranularitySelection,
    pub buckets: BucketSeries,
    pub fit: TrendFit,
}

/// Metrics and forecast computed from a single aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingReport {
    pub selection: GranularitySelection,
    pub metrics: SpendingMetrics,
    pub forecast: ForecastSeries,
}

/// Stateless spending analysis engine
#[derive(Debug, Clone, Default)]
pub struct SpendingEngine {
    config: EngineConfig,
}

impl SpendingEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Select granularity from the span, bucket the records and fit the trend
    pub fn analyze_trend(&self, records: &[TransactionRecord]) -> Result<TrendAnalysis> {
        validate_records(records)?;
        let span = record_span(records)?;

        let selection = self.config.granularity_table.select(span.whole_days());
        debug!(
            span_days = span.whole_days(),
            granularity = %selection.granularity,
            horizon = selection.horizon,
            "selected granularity"
        );

        let buckets = aggregate(records, selection.granularity)?;
        let fit = fit_trend(&buckets, self.config.stable_slope_tolerance)?;

        Ok(TrendAnalysis {
            selection,
            buckets,
            fit,
        })
    }

    /// Total, monthly average, category breakdown and trend
    pub fn metrics(&self, records: &[TransactionRecord]) -> Result<SpendingMetrics> {
        let analysis = self.analyze_trend(records)?;
        spending_metrics(records, &analysis.fit, self.config.days_per_month)
    }

    /// Forecast using the engine's default random source
    pub fn forecast(&self, records: &[TransactionRecord]) -> Result<ForecastSeries> {
        let mut rng = self.default_rng();
        self.forecast_with_rng(records, &mut rng)
    }

    /// Forecast drawing noise from the supplied random source
    pub fn forecast_with_rng<R: Rng + ?Sized>(
        &self,
        records: &[TransactionRecord],
        rng: &mut R,
    ) -> Result<ForecastSeries> {
        let analysis = self.analyze_trend(records)?;
        self.forecast_from(&analysis, rng)
    }

    /// Metrics and forecast sharing one aggregation and fit
    pub fn report<R: Rng + ?Sized>(
        &self,
        records: &[TransactionRecord],
        rng: &mut R,
    ) -> Result<SpendingReport> {
        let analysis = self.analyze_trend(records)?;
        let metrics = spending_metrics(records, &analysis.fit, self.config.days_per_month)?;
        let forecast = self.forecast_from(&analysis, rng)?;

        Ok(SpendingReport {
            selection: analysis.selection,
            metrics,
            forecast,
        })
    }

    /// Seeded when the configuration carries a seed, entropy-seeded otherwise
    pub fn default_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn forecast_from<R: Rng + ?Sized>(
        &self,
        analysis: &TrendAnalysis,
        rng: &mut R,
    ) -> Result<ForecastSeries> {
        generate_forecast(
            &analysis.buckets,
            &analysis.fit,
            analysis.selection.horizon,
            self.config.noise_fraction,
            rng,
        )
    }
}
