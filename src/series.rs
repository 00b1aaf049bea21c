//! Daily price series handling: calendar-grid normalization and gap filling

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// A single historical price row as read from the store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// A price series reindexed to a strict daily calendar grid.
///
/// The grid spans from the earliest to the latest observed date inclusive;
/// dates with no observation hold `None`. Gap detection and forward filling
/// operate on this grid, never on the raw observation list.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<Option<f64>>,
}

impl DailySeries {
    /// Build the daily grid from date-ordered observations.
    ///
    /// Out-of-order input is tolerated (the grid is keyed by date); a
    /// duplicated date keeps the last value, matching the store's
    /// one-observation-per-date contract being enforced upstream.
    pub fn from_observations(observations: &[PriceObservation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::NoData);
        }

        let start = observations.iter().map(|o| o.date).min().unwrap_or(observations[0].date);
        let end = observations.iter().map(|o| o.date).max().unwrap_or(observations[0].date);
        let len = (end - start).num_days() as usize + 1;

        let mut values = vec![None; len];
        for obs in observations {
            let idx = (obs.date - start).num_days() as usize;
            values[idx] = Some(obs.price);
        }

        Ok(Self { start, values })
    }

    /// Number of rows in the daily grid, gaps included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First date of the grid
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the grid
    pub fn end_date(&self) -> NaiveDate {
        self.start + Duration::days(self.values.len() as i64 - 1)
    }

    /// Date of the row at `index`
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// Value of the row at `index`, `None` for a gap
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Number of calendar dates with no observation
    pub fn gap_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// The price sequence with gaps dropped, preserving date order.
    ///
    /// This is the input to the stationarity test, which has no notion of
    /// the calendar grid.
    pub fn dense_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| *v).collect()
    }

    /// The full grid as a value-per-row vector, `None` marking gaps
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Replace each gap with the most recent preceding defined value.
    ///
    /// Gaps before the first defined value stay undefined. The grid always
    /// starts at an observed date, so in practice a filled series has no
    /// remaining gaps.
    pub fn forward_fill(&mut self) {
        let mut last = None;
        for slot in self.values.iter_mut() {
            match slot {
                Some(v) => last = Some(*v),
                None => *slot = last,
            }
        }
    }

    /// The last `n` rows of the grid by position, as (date, value) pairs.
    ///
    /// Rows are positional: a row inside a still-unfilled gap carries `None`.
    /// Returns fewer than `n` rows when the grid is shorter than `n`.
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, Option<f64>)> {
        let skip = self.values.len().saturating_sub(n);
        self.values
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, v)| (self.date_at(i), *v))
            .collect()
    }
}
