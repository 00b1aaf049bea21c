use std::sync::Arc;

use sqlx::mysql::MySqlPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use price_forecast_api::config::Config;
use price_forecast_api::http::{router, AppState};
use price_forecast_api::store::MySqlPriceStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("price_forecast_api=debug".parse()?),
        )
        .with_target(true)
        .init();

    let config = Config::from_env()?;
    info!("Starting price-forecast-api v{}", price_forecast_api::VERSION);

    let pool = MySqlPool::connect(&config.database_url).await?;
    info!("Connected to prices database");

    let state = AppState::new(Arc::new(MySqlPriceStore::new(pool)));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
