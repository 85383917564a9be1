//! Seasonal-trend decomposition family (MSTL + AutoETS via `augurs`)
//!
//! Additive weekly (and, with enough history, yearly) seasonal components
//! are split off by MSTL and the deseasonalized remainder is forecast with
//! an automatically selected ETS trend model. Forecasting beyond the
//! training range extrapolates the fitted trend and seasonal components;
//! very long horizons degrade the trend extrapolation and are accepted
//! as-is.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastOutput, INTERVAL_WIDTH};
use augurs::ets::AutoETS;
use augurs::forecaster::{transforms::LinearInterpolator, Forecaster, Transformer};
use augurs::mstl::MSTLModel;

/// Weekly seasonal period in daily observations
pub const WEEKLY_PERIOD: usize = 7;

/// Yearly seasonal period in daily observations
pub const YEARLY_PERIOD: usize = 365;

/// Minimum observations: two full cycles of the shortest seasonal period
pub const MIN_OBSERVATIONS: usize = 2 * WEEKLY_PERIOD;

/// Interval fallback when the backend yields no bounds: ±20% of the point
const FALLBACK_BAND: f64 = 0.2;

/// Untrained seasonal-trend model configuration
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    interval_width: f64,
}

impl Default for SeasonalTrendModel {
    fn default() -> Self {
        Self {
            interval_width: INTERVAL_WIDTH,
        }
    }
}

impl SeasonalTrendModel {
    /// Validate the series and capture it for decomposition.
    ///
    /// Seasonal periods are chosen from the series length: weekly always,
    /// yearly only when at least two full years are present.
    pub fn fit(&self, values: &[f64]) -> Result<TrainedSeasonal> {
        if values.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::FittingFailed(format!(
                "Seasonal-trend model needs at least {} observations, got {}",
                MIN_OBSERVATIONS,
                values.len()
            )));
        }

        let mut periods = vec![WEEKLY_PERIOD];
        if values.len() >= 2 * YEARLY_PERIOD {
            periods.push(YEARLY_PERIOD);
        }

        Ok(TrainedSeasonal {
            values: values.to_vec(),
            periods,
            interval_width: self.interval_width,
        })
    }
}

/// Fitted seasonal-trend model
#[derive(Debug, Clone)]
pub struct TrainedSeasonal {
    values: Vec<f64>,
    periods: Vec<usize>,
    interval_width: f64,
}

impl TrainedSeasonal {
    /// Seasonal periods used by the decomposition
    pub fn periods(&self) -> &[usize] {
        &self.periods
    }

    /// Forecast `horizon` steps, with bounds at the 80% interval width
    pub fn forecast(&self, horizon: usize) -> Result<ForecastOutput> {
        let ets = AutoETS::non_seasonal().into_trend_model();
        let mstl = MSTLModel::new(self.periods.clone(), ets);

        let transformers: Vec<Box<dyn Transformer>> =
            vec![Box::new(LinearInterpolator::default())];
        let mut forecaster = Forecaster::new(mstl).with_transformers(transformers);

        forecaster
            .fit(&self.values)
            .map_err(|e| ForecastError::FittingFailed(format!("MSTL fit error: {e}")))?;

        let forecast = forecaster
            .predict(horizon, self.interval_width)
            .map_err(|e| ForecastError::FittingFailed(format!("MSTL predict error: {e}")))?;

        let point = forecast.point.clone();
        let (lower, upper) = match forecast.intervals {
            Some(intervals) => (intervals.lower, intervals.upper),
            None => {
                let lower = point.iter().map(|v| v - FALLBACK_BAND * v.abs()).collect();
                let upper = point.iter().map(|v| v + FALLBACK_BAND * v.abs()).collect();
                (lower, upper)
            }
        };

        ForecastOutput::new(point, lower, upper)
    }
}
