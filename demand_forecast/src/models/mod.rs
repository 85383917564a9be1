//! Forecasting model adapters
//!
//! Two model families sit behind one fit/forecast contract: a seasonal-trend
//! decomposition backed by the `augurs` MSTL/ETS stack, and a classical
//! ARIMA fitted in-crate by conditional least squares. The orchestrator and
//! backtest engine only ever talk to [`ModelFamily`] and [`TrainedModel`].

use crate::data::SeriesView;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod arima;
pub mod seasonal;

use arima::{ArimaModel, TrainedArima};
use seasonal::{SeasonalTrendModel, TrainedSeasonal};

/// Probability mass captured by the forecast bounds
pub const INTERVAL_WIDTH: f64 = 0.8;

/// Default ARIMA order, with the single downgrade tried on fit failure
pub const ARIMA_DEFAULT_ORDER: (usize, usize, usize) = (2, 1, 2);
pub const ARIMA_FALLBACK_ORDER: (usize, usize, usize) = (1, 1, 1);

/// Supported forecasting model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    /// Seasonal-trend decomposition (weekly + yearly seasonality, ETS trend)
    #[serde(rename = "prophet")]
    SeasonalTrend,
    /// ARIMA(2,1,2), downgraded once to ARIMA(1,1,1) on fit failure
    #[serde(rename = "arima")]
    Arima,
}

impl ModelFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::SeasonalTrend => "prophet",
            ModelFamily::Arima => "arima",
        }
    }

    /// Fit this family on a series, producing a trained model.
    ///
    /// The ARIMA path retries once with the simplified order before giving
    /// up; no further fallback exists, and the second failure propagates.
    pub fn fit(&self, series: &SeriesView) -> Result<TrainedModel> {
        match self {
            ModelFamily::SeasonalTrend => {
                let trained = SeasonalTrendModel::default().fit(series.values())?;
                Ok(TrainedModel::SeasonalTrend(trained))
            }
            ModelFamily::Arima => {
                let (p, d, q) = ARIMA_DEFAULT_ORDER;
                match ArimaModel::new(p, d, q).fit(series.values()) {
                    Ok(trained) => Ok(TrainedModel::Arima(trained)),
                    Err(_) => {
                        let (p, d, q) = ARIMA_FALLBACK_ORDER;
                        let trained = ArimaModel::new(p, d, q).fit(series.values())?;
                        Ok(TrainedModel::Arima(trained))
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prophet" => Ok(ModelFamily::SeasonalTrend),
            "arima" => Ok(ModelFamily::Arima),
            other => Err(ForecastError::ValidationError(format!(
                "Unknown model family '{}', expected 'prophet' or 'arima'",
                other
            ))),
        }
    }
}

/// Point forecasts plus interval bounds, all horizon-length
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ForecastOutput {
    pub fn new(point: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if point.len() != lower.len() || point.len() != upper.len() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast bounds lengths ({}, {}) don't match point length ({})",
                lower.len(),
                upper.len(),
                point.len()
            )));
        }
        Ok(Self { point, lower, upper })
    }

    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Reject an output whose length differs from the requested horizon
    pub fn expect_horizon(self, horizon: usize) -> Result<Self> {
        if self.horizon() != horizon {
            return Err(ForecastError::FittingFailed(format!(
                "Backend produced {} points for a {}-step forecast",
                self.horizon(),
                horizon
            )));
        }
        Ok(self)
    }
}

/// A fitted model of either family, scoped to one orchestrator call
#[derive(Debug, Clone)]
pub enum TrainedModel {
    SeasonalTrend(TrainedSeasonal),
    Arima(TrainedArima),
}

impl TrainedModel {
    /// Forecast `horizon` steps beyond the training range
    pub fn forecast(&self, horizon: usize) -> Result<ForecastOutput> {
        if horizon == 0 {
            return Err(ForecastError::ValidationError(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        let output = match self {
            TrainedModel::SeasonalTrend(model) => model.forecast(horizon),
            TrainedModel::Arima(model) => model.forecast(horizon),
        }?;
        // A short or long backend output must never truncate or pad the
        // response silently
        output.expect_horizon(horizon)
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            TrainedModel::SeasonalTrend(_) => ModelFamily::SeasonalTrend,
            TrainedModel::Arima(_) => ModelFamily::Arima,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_rejects_mismatched_bound_lengths() {
        let result = ForecastOutput::new(vec![1.0, 2.0], vec![0.0], vec![2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }

    #[test]
    fn output_length_must_match_requested_horizon() {
        let output =
            ForecastOutput::new(vec![1.0, 2.0], vec![0.0, 1.0], vec![2.0, 3.0]).unwrap();
        assert!(output.clone().expect_horizon(2).is_ok());
        assert!(matches!(
            output.expect_horizon(5),
            Err(ForecastError::FittingFailed(_))
        ));
    }
}
