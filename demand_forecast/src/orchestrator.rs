//! Forecast orchestration: per-item, per-target fitting and evaluation
//!
//! For one item the orchestrator runs the model adapter over both target
//! variables, producing forward forecasts with interval bounds plus
//! backtest-derived accuracy metrics. Targets are processed independently:
//! a backtest failure degrades that target's metrics block to an error
//! marker, while a forward-fit failure fails the request.

use crate::backtest::{backtest, AccuracyMetrics, DEFAULT_HOLDOUT_DAYS};
use crate::data::{HistoricalData, SeriesView, Target};
use crate::error::{ForecastError, Result};
use crate::models::{ModelFamily, TrainedModel};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Minimum observations an item needs before any forecast is attempted
pub const MIN_OBSERVATIONS: usize = 30;

/// One forecasted day for one target variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Backtest metrics, or an explicit marker when backtesting failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricsOutcome {
    Metrics(AccuracyMetrics),
    Failed { error: String },
}

/// Forward forecast plus accuracy evaluation for one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetForecast {
    pub points: Vec<ForecastPoint>,
    pub metrics: MetricsOutcome,
}

/// Complete forecast result for one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemForecast {
    pub item_id: String,
    pub model: ModelFamily,
    pub forecast_days: usize,
    pub generated_at: DateTime<Utc>,
    pub targets: BTreeMap<Target, TargetForecast>,
}

/// Fitted models keyed by (item, target, family), scoped to a single
/// orchestrator call. Never shared across requests.
#[derive(Debug, Default)]
struct ModelCache {
    models: HashMap<(String, Target, ModelFamily), TrainedModel>,
}

impl ModelCache {
    fn fit(
        &mut self,
        item_id: &str,
        target: Target,
        family: ModelFamily,
        series: &SeriesView,
    ) -> Result<&TrainedModel> {
        match self.models.entry((item_id.to_string(), target, family)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let model = family.fit(series)?;
                Ok(entry.insert(model))
            }
        }
    }
}

/// Orchestrates model fitting, forecasting and backtesting over the
/// immutable historical snapshot.
#[derive(Debug, Clone)]
pub struct ForecastOrchestrator {
    data: Arc<HistoricalData>,
}

impl ForecastOrchestrator {
    pub fn new(data: Arc<HistoricalData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &HistoricalData {
        &self.data
    }

    /// Unknown-item and series-length checks, run before any fitting
    fn validate_item(&self, item_id: &str) -> Result<()> {
        let records = self.data.item_records(item_id)?;
        if records.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                item: item_id.to_string(),
                observations: records.len(),
                required: MIN_OBSERVATIONS,
            });
        }
        Ok(())
    }

    /// Forecast demand and price `horizon` days forward for one item.
    ///
    /// Each target is fit on its full series and forecast dates extend the
    /// calendar one day per step past the last observation. Accuracy
    /// metrics come from an independent 30-day-holdout backtest.
    pub fn generate_forecast(
        &self,
        item_id: &str,
        horizon: usize,
        family: ModelFamily,
    ) -> Result<ItemForecast> {
        if horizon == 0 {
            return Err(ForecastError::ValidationError(
                "Forecast horizon must be at least 1 day".to_string(),
            ));
        }
        self.validate_item(item_id)?;

        let mut cache = ModelCache::default();
        let mut targets = BTreeMap::new();

        for target in Target::ALL {
            let series = self.data.series(item_id, target)?;
            let last_date = series.last_date().ok_or_else(|| {
                ForecastError::InsufficientData {
                    item: item_id.to_string(),
                    observations: 0,
                    required: MIN_OBSERVATIONS,
                }
            })?;

            let model = cache.fit(item_id, target, family, &series)?;
            let output = model.forecast(horizon)?;

            let points = (1..=horizon as i64)
                .zip(output.point.iter())
                .zip(output.lower.iter().zip(output.upper.iter()))
                .map(|((step, &forecast), (&lower, &upper))| ForecastPoint {
                    date: last_date + Duration::days(step),
                    forecast,
                    lower,
                    upper,
                })
                .collect();

            // Backtest failures degrade this target's metrics instead of
            // aborting the request
            let metrics = match backtest(&series, family, DEFAULT_HOLDOUT_DAYS) {
                Ok(metrics) => MetricsOutcome::Metrics(metrics),
                Err(e) => MetricsOutcome::Failed {
                    error: e.to_string(),
                },
            };

            targets.insert(target, TargetForecast { points, metrics });
        }

        Ok(ItemForecast {
            item_id: item_id.to_string(),
            model: family,
            forecast_days: horizon,
            generated_at: Utc::now(),
            targets,
        })
    }

    /// Backtest accuracy for both targets without a forward forecast
    pub fn backtest_item(
        &self,
        item_id: &str,
        family: ModelFamily,
    ) -> Result<BTreeMap<Target, MetricsOutcome>> {
        self.validate_item(item_id)?;

        let mut outcomes = BTreeMap::new();
        for target in Target::ALL {
            let series = self.data.series(item_id, target)?;
            let outcome = match backtest(&series, family, DEFAULT_HOLDOUT_DAYS) {
                Ok(metrics) => MetricsOutcome::Metrics(metrics),
                Err(e) => MetricsOutcome::Failed {
                    error: e.to_string(),
                },
            };
            outcomes.insert(target, outcome);
        }
        Ok(outcomes)
    }
}
