//! # Price Forecast API
//!
//! A single-endpoint HTTP service that reads historical daily prices from a
//! relational store, checks the series for a unit root with an Augmented
//! Dickey-Fuller test, forward-fills calendar gaps, fits an ARIMA(1,1,1) by
//! conditional sum of squares, and serves a 3-day point forecast next to the
//! last 4 actual rows.
//!
//! The pipeline is request-scoped: every call re-fetches and re-fits from the
//! full history, so the result depends only on the store contents and the
//! cutoff date. The response schema keeps the external field names `Tanggal`
//! (date) and `Harga` (price).

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod series;
pub mod stationarity;
pub mod store;

// Re-export commonly used types
pub use crate::error::{ForecastError, Result};
pub use crate::models::arima::{ArimaModel, FittedArima};
pub use crate::models::ForecastResult;
pub use crate::pipeline::{run_forecast, ForecastResponse, SeriesPoint};
pub use crate::series::{DailySeries, PriceObservation};
pub use crate::stationarity::{adf_test, AdfResult};
pub use crate::store::{MemoryStore, MySqlPriceStore, PriceStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
