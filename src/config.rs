//! Environment-driven configuration

use crate::error::{ForecastError, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// MySQL connection string for the prices database
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from the environment (after `.env` has been read)
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ForecastError::Config("DATABASE_URL is not set".to_string()))?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            database_url,
            bind_addr,
        })
    }
}
