//! DailySeries: one aggregated observation per calendar date.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// How dates with no transactions inside the observed range are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Missing dates are absent from the series (no observation).
    #[default]
    Absent,
    /// Missing dates become observed zero demand.
    ZeroFill,
}

/// A strictly date-ordered series of daily totals.
///
/// Dates need not be contiguous: a missing date is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series from parallel date and value vectors.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }

        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(ForecastError::TimestampError(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidInput(format!(
                "non-finite value on {}",
                dates[pos]
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a series from (date, value) pairs already in date order.
    pub fn from_pairs(pairs: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    /// An empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Days between the first and last observation (0 for fewer than two).
    pub fn span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }

    /// Iterate over (date, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Sum of all observations.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Mean daily total, `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.total() / self.len() as f64)
        }
    }

    /// Number of calendar dates inside the span with no observation.
    pub fn missing_dates(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.span_days() as usize + 1) - self.len()
    }

    /// Apply a gap policy, returning a new series.
    pub fn with_gap_policy(&self, policy: GapPolicy) -> DailySeries {
        match policy {
            GapPolicy::Absent => self.clone(),
            GapPolicy::ZeroFill => self.zero_filled(),
        }
    }

    /// Insert zero observations for every missing date between the first
    /// and last observation.
    pub fn zero_filled(&self) -> DailySeries {
        let (first, last) = match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.clone(),
        };

        let capacity = self.span_days() as usize + 1;
        let mut dates = Vec::with_capacity(capacity);
        let mut values = Vec::with_capacity(capacity);
        let mut observed = self.iter().peekable();
        let mut date = first;
        while date <= last {
            let value = match observed.peek() {
                Some(&(d, v)) if d == date => {
                    observed.next();
                    v
                }
                _ => 0.0,
            };
            dates.push(date);
            values.push(value);
            date += Duration::days(1);
        }

        DailySeries { dates, values }
    }
}
