//! Price store access
//!
//! The pipeline only ever needs one query: every observation dated at or
//! before a cutoff, oldest first. That contract is a trait so the HTTP layer
//! can be handed any backing store; production uses MySQL through sqlx.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::MySqlPool;

use crate::error::Result;
use crate::series::PriceObservation;

/// Read access to the historical price table
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// All observations with `date <= cutoff`, ordered by date ascending
    async fn fetch(&self, cutoff: NaiveDate) -> Result<Vec<PriceObservation>>;
}

/// MySQL-backed store over the `prices` table
/// (`id` int primary key, `date` DATE not null, `price` DOUBLE not null)
#[derive(Debug, Clone)]
pub struct MySqlPriceStore {
    pool: MySqlPool,
}

impl MySqlPriceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for MySqlPriceStore {
    async fn fetch(&self, cutoff: NaiveDate) -> Result<Vec<PriceObservation>> {
        let rows: Vec<(NaiveDate, f64)> = sqlx::query_as(
            "SELECT date, price FROM prices WHERE date <= ? ORDER BY date ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, price)| PriceObservation::new(date, price))
            .collect())
    }
}

/// In-memory store for tests and local experiments
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    observations: Vec<PriceObservation>,
}

impl MemoryStore {
    pub fn new(mut observations: Vec<PriceObservation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { observations }
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn fetch(&self, cutoff: NaiveDate) -> Result<Vec<PriceObservation>> {
        Ok(self
            .observations
            .iter()
            .copied()
            .filter(|o| o.date <= cutoff)
            .collect())
    }
}
