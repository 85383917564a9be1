//! # Demand Forecast
//!
//! A Rust library for per-item demand and price forecasting with cost and
//! waste analytics over a flat historical dataset.
//!
//! ## Features
//!
//! - Historical dataset loading into an immutable snapshot (CSV, one row
//!   per item-date)
//! - Two forecasting model families behind one adapter: seasonal-trend
//!   decomposition (MSTL + AutoETS) and ARIMA with a single order fallback
//! - Held-out backtesting with MAE/MSE/RMSE/MAPE/R² accuracy metrics
//! - Forecast orchestration over both target variables (demand, price)
//!   with 80% interval bounds and per-target failure isolation
//! - Trailing-window cost and waste analytics
//! - Seeded synthetic dataset generation
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::analytics::{cost_analysis, AnalysisPeriod};
//! use demand_forecast::data::DataLoader;
//! use demand_forecast::models::ModelFamily;
//! use demand_forecast::orchestrator::ForecastOrchestrator;
//! use std::sync::Arc;
//!
//! # fn main() -> demand_forecast::error::Result<()> {
//! // Load the dataset once and freeze it
//! let data = Arc::new(DataLoader::from_csv("data/historical_data.csv")?);
//!
//! // Forecast 90 days of demand and price for one item
//! let orchestrator = ForecastOrchestrator::new(Arc::clone(&data));
//! let forecast = orchestrator.generate_forecast("ITEM001", 90, ModelFamily::SeasonalTrend)?;
//!
//! // Trailing-window cost/waste aggregates
//! let analysis = cost_analysis(&data, "ITEM001", AnalysisPeriod::Month)?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod backtest;
pub mod data;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod sample;

// Re-export commonly used types
pub use crate::analytics::{cost_analysis, AnalysisPeriod, CostAnalysis};
pub use crate::backtest::{backtest, AccuracyMetrics};
pub use crate::data::{DataLoader, HistoricalData, HistoricalRecord, SeriesView, Target};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastOutput, ModelFamily, TrainedModel};
pub use crate::orchestrator::{ForecastOrchestrator, ForecastPoint, ItemForecast, MetricsOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
