use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use demand_forecast::backtest::{backtest, AccuracyMetrics};
use demand_forecast::data::SeriesView;
use demand_forecast::error::ForecastError;
use demand_forecast::models::ModelFamily;
use rstest::rstest;

fn noisy_series(days: usize) -> SeriesView {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..days as i64).map(|i| start + Duration::days(i)).collect();
    let values = (0..days)
        .map(|i| {
            let t = i as f64;
            80.0 + 0.15 * t + 6.0 * (t * 0.8).sin() + 2.0 * (t * 1.7).cos()
        })
        .collect();
    SeriesView::new(dates, values).unwrap()
}

#[rstest]
#[case(ModelFamily::SeasonalTrend)]
#[case(ModelFamily::Arima)]
fn backtest_yields_consistent_metrics(#[case] family: ModelFamily) {
    let series = noisy_series(200);
    let metrics = backtest(&series, family, 30).unwrap();

    assert!(metrics.mae >= 0.0);
    assert!(metrics.mse >= 0.0);
    assert_approx_eq!(metrics.rmse, metrics.mse.sqrt(), 1e-12);
    assert!(metrics.r2_score <= 1.0);
    // Actuals are well away from zero here, so MAPE is defined
    assert!(metrics.mape.is_some());
}

#[test]
fn holdout_must_leave_training_data() {
    let series = noisy_series(20);
    assert!(matches!(
        backtest(&series, ModelFamily::Arima, 20),
        Err(ForecastError::ValidationError(_))
    ));
    assert!(matches!(
        backtest(&series, ModelFamily::Arima, 0),
        Err(ForecastError::ValidationError(_))
    ));
}

#[test]
fn fitting_failure_inside_backtest_propagates() {
    // Linear training window makes both ARIMA orders singular
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..80i64).map(|i| start + Duration::days(i)).collect();
    let values = (0..80).map(|i| 5.0 + 3.0 * i as f64).collect();
    let series = SeriesView::new(dates, values).unwrap();

    assert!(matches!(
        backtest(&series, ModelFamily::Arima, 30),
        Err(ForecastError::FittingFailed(_))
    ));
}

#[test]
fn metrics_serialize_null_mape_for_zero_actuals() {
    let metrics = AccuracyMetrics::compute(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]).unwrap();
    let json = serde_json::to_value(&metrics).unwrap();
    assert!(json["mape"].is_null());
    assert!(json["mae"].is_number());
}
