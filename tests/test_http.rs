use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Local};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use price_forecast_api::http::{router, AppState};
use price_forecast_api::{MemoryStore, PriceObservation};

fn app_with_prices(prices: &[f64]) -> axum::Router {
    let today = Local::now().date_naive();
    let observations = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let offset = (prices.len() - 1 - i) as i64;
            PriceObservation::new(today - Duration::days(offset), price)
        })
        .collect();
    router(AppState::new(Arc::new(MemoryStore::new(observations))))
}

async fn get_forecast(app: axum::Router) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/forecast")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn forecast_returns_four_actuals_and_three_forecasts() {
    let app = app_with_prices(&[100.0, 101.0, 99.0, 102.0, 103.0, 104.0, 102.0, 105.0]);

    let (status, body) = get_forecast(app).await;

    assert_eq!(status, StatusCode::OK);
    let actual = body["actual_data"].as_array().unwrap();
    let forecast = body["forecast_data"].as_array().unwrap();
    assert_eq!(actual.len(), 4);
    assert_eq!(forecast.len(), 3);

    for row in actual.iter().chain(forecast.iter()) {
        assert!(row.get("Tanggal").is_some());
        assert!(row["Harga"].as_f64().is_some());
    }

    let today = Local::now().date_naive();
    let first_forecast: chrono::NaiveDate =
        forecast[0]["Tanggal"].as_str().unwrap().parse().unwrap();
    assert_eq!(first_forecast, today + Duration::days(1));
}

#[tokio::test]
async fn empty_store_responds_404_with_fixed_body() {
    let app = router(AppState::new(Arc::new(MemoryStore::new(Vec::new()))));

    let (status, body) = get_forecast(app).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "error": "No data available" }));
}

#[tokio::test]
async fn degenerate_series_responds_500_with_error_text() {
    // Three observations are too few for the stationarity test
    let app = app_with_prices(&[100.0, 101.0, 102.0]);

    let (status, body) = get_forecast(app).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let app = app_with_prices(&[100.0, 101.0, 99.0, 102.0, 103.0]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/forecast")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow_origin = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("allow-origin header present");
    assert_eq!(allow_origin, "*");
}
