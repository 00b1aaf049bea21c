//! Error types for the forecasting pipeline

use thiserror::Error;

/// Custom error types for the forecasting pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The store has no observations at or before the cutoff date
    #[error("No data available")]
    NoData,

    /// Error from the backing price store
    #[error("Store error: {0}")]
    Store(String),

    /// Error from the stationarity test
    #[error("Stationarity test error: {0}")]
    Stationarity(String),

    /// Error from model estimation or forecasting
    #[error("Estimation error: {0}")]
    Estimation(String),

    /// Error from invalid parameters or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from configuration loading
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<sqlx::Error> for ForecastError {
    fn from(err: sqlx::Error) -> Self {
        ForecastError::Store(err.to_string())
    }
}
