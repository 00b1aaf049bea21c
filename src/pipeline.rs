//! The forecasting pipeline
//!
//! One request runs the whole chain from scratch: fetch the history up to the
//! cutoff date, normalize it onto a daily grid, run the stationarity check,
//! forward-fill gaps, fit an ARIMA(1,1,1), forecast three days ahead and
//! assemble the response. Nothing is cached; the result is a pure function of
//! the store contents and the cutoff date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::arima::ArimaModel;
use crate::series::DailySeries;
use crate::stationarity::adf_test;
use crate::store::PriceStore;

/// Days forecast beyond the cutoff date
pub const FORECAST_HORIZON: usize = 3;
/// Trailing grid rows reported as actuals
pub const ACTUAL_TAIL_ROWS: usize = 4;
/// Fixed model order: one AR term, first differencing, one MA term
pub const ARIMA_ORDER: (usize, usize, usize) = (1, 1, 1);

/// Label distinguishing observed rows from forecast rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Actual,
    Forecast,
}

/// A labeled row of the combined actual-plus-forecast series
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: Option<f64>,
    pub kind: SeriesKind,
}

/// Wire form of a row, using the external schema's field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(rename = "Tanggal")]
    pub date: NaiveDate,
    #[serde(rename = "Harga")]
    pub price: Option<f64>,
}

/// The `GET /forecast` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub actual_data: Vec<SeriesPoint>,
    pub forecast_data: Vec<SeriesPoint>,
}

/// Run the full pipeline against `store` as of `cutoff`.
///
/// The cutoff is a parameter rather than wall-clock time so callers and tests
/// control it; the HTTP layer passes the server's local date.
pub async fn run_forecast(store: &dyn PriceStore, cutoff: NaiveDate) -> Result<ForecastResponse> {
    let observations = store.fetch(cutoff).await?;
    if observations.is_empty() {
        return Err(crate::error::ForecastError::NoData);
    }
    debug!(rows = observations.len(), %cutoff, "fetched observations");

    let mut series = DailySeries::from_observations(&observations)?;
    debug!(
        grid_rows = series.len(),
        gaps = series.gap_count(),
        "normalized to daily grid"
    );

    // The verdict is informational: filling is unconditional, but the check
    // is part of the pipeline's contract and its failure is a request failure.
    let adf = adf_test(&series.dense_values())?;
    if adf.is_nonstationary() {
        debug!(
            statistic = adf.statistic,
            p_value = adf.p_value,
            "series treated as non-stationary"
        );
    } else {
        debug!(
            statistic = adf.statistic,
            p_value = adf.p_value,
            "series treated as stationary"
        );
    }

    series.forward_fill();

    let (p, d, q) = ARIMA_ORDER;
    let values: Vec<f64> = series
        .values()
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let fitted = ArimaModel::new(p, d, q).fit(&values).map_err(|err| {
        warn!(error = %err, "model fit failed");
        err
    })?;
    let forecast = fitted.forecast(FORECAST_HORIZON)?;

    Ok(assemble_response(&series, cutoff, forecast.values()))
}

/// Merge the grid tail with the forecast steps, label each row, then split
/// back into the two response arrays by label.
fn assemble_response(
    series: &DailySeries,
    cutoff: NaiveDate,
    forecasts: &[f64],
) -> ForecastResponse {
    let mut combined: Vec<ForecastPoint> = series
        .tail(ACTUAL_TAIL_ROWS)
        .into_iter()
        .map(|(date, price)| ForecastPoint {
            date,
            price,
            kind: SeriesKind::Actual,
        })
        .collect();

    for (step, &value) in forecasts.iter().enumerate() {
        combined.push(ForecastPoint {
            date: cutoff + Duration::days(step as i64 + 1),
            price: Some(value),
            kind: SeriesKind::Forecast,
        });
    }

    let to_wire = |point: &ForecastPoint| SeriesPoint {
        date: point.date,
        price: point.price,
    };

    ForecastResponse {
        actual_data: combined
            .iter()
            .filter(|p| p.kind == SeriesKind::Actual)
            .map(to_wire)
            .collect(),
        forecast_data: combined
            .iter()
            .filter(|p| p.kind == SeriesKind::Forecast)
            .map(to_wire)
            .collect(),
    }
}
