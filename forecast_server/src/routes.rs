//! API route handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use demand_forecast::analytics::{cost_analysis, AnalysisPeriod, CostAnalysis};
use demand_forecast::data::Target;
use demand_forecast::error::ForecastError;
use demand_forecast::models::ModelFamily;
use demand_forecast::orchestrator::{ItemForecast, MetricsOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AppState;

/// Largest forecast horizon the API accepts, in days
const MAX_FORECAST_DAYS: usize = 365;

/// Error body returned for every non-success response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ForecastError wrapper carrying the HTTP status mapping
#[derive(Debug)]
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ForecastError::UnknownItem(_) => StatusCode::NOT_FOUND,
            ForecastError::InsufficientData { .. } | ForecastError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            ForecastError::FittingFailed(_)
            | ForecastError::DataUnavailable(_)
            | ForecastError::IoError(_)
            | ForecastError::CsvError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<String>,
}

/// `GET /items` — item identifiers present in the dataset
pub async fn list_items(State(state): State<AppState>) -> Json<ItemsResponse> {
    Json(ItemsResponse {
        items: state.orchestrator.data().items(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<usize>,
    pub model: Option<String>,
}

fn parse_model(model: Option<&str>) -> Result<ModelFamily, ApiError> {
    match model {
        None => Ok(ModelFamily::SeasonalTrend),
        Some(s) => Ok(s.parse::<ModelFamily>()?),
    }
}

/// `GET /forecast/:item_id?days=..&model=..` — demand and price forecasts
/// with interval bounds and backtest metrics
pub async fn forecast(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ItemForecast>, ApiError> {
    let days = query.days.unwrap_or(90);
    if !(1..=MAX_FORECAST_DAYS).contains(&days) {
        return Err(ForecastError::ValidationError(format!(
            "days must be between 1 and {}, got {}",
            MAX_FORECAST_DAYS, days
        ))
        .into());
    }
    let family = parse_model(query.model.as_deref())?;

    let result = state.orchestrator.generate_forecast(&item_id, days, family)?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub item_id: String,
    pub model: ModelFamily,
    pub metrics: BTreeMap<Target, MetricsOutcome>,
}

/// `GET /metrics/:item_id?model=..` — backtest accuracy for both targets
pub async fn metrics(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let family = parse_model(query.model.as_deref())?;
    let metrics = state.orchestrator.backtest_item(&item_id, family)?;
    Ok(Json(MetricsResponse {
        item_id,
        model: family,
        metrics,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CostAnalysisQuery {
    pub period: Option<String>,
}

/// `GET /cost-analysis/:item_id?period=..` — trailing cost/waste aggregates
pub async fn cost_analysis_route(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<CostAnalysisQuery>,
) -> Result<Json<CostAnalysis>, ApiError> {
    let period = match query.period.as_deref() {
        None => AnalysisPeriod::Month,
        Some(s) => s.parse::<AnalysisPeriod>()?,
    };
    let analysis = cost_analysis(state.orchestrator.data(), &item_id, period)?;
    Ok(Json(analysis))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub dataset_loaded: bool,
    pub records: usize,
}

/// `GET /health` — liveness plus dataset load state
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let data = state.orchestrator.data();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        dataset_loaded: !data.is_empty(),
        records: data.len(),
    })
}
