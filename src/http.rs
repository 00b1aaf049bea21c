//! HTTP surface: a single `GET /forecast` route
//!
//! The handler owns no state beyond an injected store handle; every request
//! re-runs the pipeline against the server's local calendar date.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ForecastError;
use crate::pipeline::run_forecast;
use crate::store::PriceStore;

/// Shared handler state: just the store handle
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }
}

/// Error body for 404 and 500 responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build the application router with any-origin CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/forecast", get(forecast_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn forecast_handler(State(state): State<AppState>) -> Response {
    let today = Local::now().date_naive();
    match run_forecast(state.store.as_ref(), today).await {
        Ok(body) => {
            info!(%today, "forecast served");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            let status = status_for(&err);
            info!(%today, %status, error = %err, "forecast request failed");
            let body = ErrorBody {
                error: err.to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}

/// Map pipeline failures to status codes: an empty store is the caller's 404,
/// everything else is reported as an internal error with its display text
fn status_for(err: &ForecastError) -> StatusCode {
    match err {
        ForecastError::NoData => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
