//! Backtesting: held-out accuracy evaluation for a model family
//!
//! A series of length N with holdout H is split into train (first N-H) and
//! test (last H) windows; the model is fit on train only and its H-step
//! forecast is compared to the held-out actuals position by position.

use crate::data::SeriesView;
use crate::error::{ForecastError, Result};
use crate::models::ModelFamily;
use serde::{Deserialize, Serialize};

/// Holdout window used by the orchestrator's accuracy evaluation
pub const DEFAULT_HOLDOUT_DAYS: usize = 30;

/// Accuracy of a forecast against equal-length held-out actuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error; zero-valued actuals are excluded,
    /// and None when every actual is zero
    pub mape: Option<f64>,
    /// Coefficient of determination against the actuals' mean
    pub r2_score: f64,
}

impl AccuracyMetrics {
    /// Compare actuals to predictions aligned by position
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() || actual.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "Actual ({}) and predicted ({}) must have the same non-zero length",
                actual.len(),
                predicted.len()
            )));
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual
            .iter()
            .zip(predicted.iter())
            .map(|(&a, &p)| a - p)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
        let rmse = mse.sqrt();

        // Percentage error is undefined at zero actuals; those points are
        // excluded rather than propagating infinities
        let nonzero: Vec<(f64, f64)> = actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| (a, e))
            .collect();
        let mape = if nonzero.is_empty() {
            None
        } else {
            let sum: f64 = nonzero.iter().map(|(a, e)| (e / a).abs()).sum();
            Some(sum / nonzero.len() as f64 * 100.0)
        };

        let mean_actual = actual.iter().sum::<f64>() / n;
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        // Constant actuals have no variance to explain; a perfect fit
        // scores 1.0, anything else 0.0
        let r2_score = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(Self {
            mae,
            mse,
            rmse,
            mape,
            r2_score,
        })
    }
}

/// Fit `family` on all but the last `holdout` points and score its forecast
/// of the held-out window.
pub fn backtest(series: &SeriesView, family: ModelFamily, holdout: usize) -> Result<AccuracyMetrics> {
    if holdout == 0 {
        return Err(ForecastError::ValidationError(
            "Backtest holdout must be at least 1".to_string(),
        ));
    }
    if holdout >= series.len() {
        return Err(ForecastError::ValidationError(format!(
            "Backtest holdout ({}) must be smaller than series length ({})",
            holdout,
            series.len()
        )));
    }

    let train = series.head(holdout)?;
    let actual = series.tail_values(holdout);

    let model = family.fit(&train)?;
    let forecast = model.forecast(holdout)?;

    AccuracyMetrics::compute(actual, &forecast.point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn metrics_match_hand_computed_values() {
        let actual = [10.0, 20.0, 30.0];
        let predicted = [12.0, 18.0, 33.0];

        let metrics = AccuracyMetrics::compute(&actual, &predicted).unwrap();
        assert_approx_eq!(metrics.mae, (2.0 + 2.0 + 3.0) / 3.0);
        assert_approx_eq!(metrics.mse, (4.0 + 4.0 + 9.0) / 3.0);
        assert_approx_eq!(metrics.rmse, metrics.mse.sqrt());
        // (2/10 + 2/20 + 3/30) / 3 * 100
        assert_approx_eq!(metrics.mape.unwrap(), 40.0 / 3.0);
    }

    #[test]
    fn rmse_is_sqrt_of_mse() {
        let actual: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let predicted: Vec<f64> = actual.iter().map(|v| v + 0.5).collect();

        let metrics = AccuracyMetrics::compute(&actual, &predicted).unwrap();
        assert_approx_eq!(metrics.rmse, metrics.mse.sqrt(), 1e-12);
    }

    #[test]
    fn mape_excludes_zero_actuals() {
        let metrics = AccuracyMetrics::compute(&[0.0, 10.0], &[1.0, 11.0]).unwrap();
        assert_approx_eq!(metrics.mape.unwrap(), 10.0);

        let all_zero = AccuracyMetrics::compute(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert!(all_zero.mape.is_none());
    }

    #[test]
    fn r2_defined_for_constant_actuals() {
        let constant = [5.0, 5.0, 5.0, 5.0];

        let perfect = AccuracyMetrics::compute(&constant, &constant).unwrap();
        assert_approx_eq!(perfect.r2_score, 1.0);

        let imperfect = AccuracyMetrics::compute(&constant, &[5.0, 6.0, 5.0, 4.0]).unwrap();
        assert_approx_eq!(imperfect.r2_score, 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = AccuracyMetrics::compute(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }
}
