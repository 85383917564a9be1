//! # forecast_server
//!
//! REST API server exposing demand/price forecasting and cost analytics
//! over a flat historical dataset loaded once at startup.

use axum::routing::get;
use axum::Router;
use demand_forecast::data::HistoricalData;
use demand_forecast::orchestrator::ForecastOrchestrator;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod routes;

/// Application state shared across handlers.
///
/// The historical snapshot is loaded once, frozen and shared by reference;
/// handlers never mutate it.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ForecastOrchestrator,
}

impl AppState {
    pub fn new(data: Arc<HistoricalData>) -> Self {
        Self {
            orchestrator: ForecastOrchestrator::new(data),
        }
    }
}

/// Build the application router with CORS and request tracing
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", get(routes::list_items))
        .route("/forecast/:item_id", get(routes::forecast))
        .route("/metrics/:item_id", get(routes::metrics))
        .route("/cost-analysis/:item_id", get(routes::cost_analysis_route))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
