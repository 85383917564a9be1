//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The historical dataset is missing or malformed; fatal at startup
    #[error("Historical data unavailable: {0}")]
    DataUnavailable(String),

    /// The requested item does not exist in the loaded dataset
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// The item's series is too short for the requested operation
    #[error("Insufficient data for item {item}: {observations} observations, need at least {required}")]
    InsufficientData {
        item: String,
        observations: usize,
        required: usize,
    },

    /// A forecasting backend failed to fit or forecast
    #[error("Model fitting failed: {0}")]
    FittingFailed(String),

    /// Error from invalid parameters or mismatched inputs
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::DataUnavailable(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
