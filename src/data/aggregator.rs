//! Collapse transactions into one total per calendar date.

use crate::core::{DailySeries, GapPolicy, SalesFilter, Transaction};
use crate::error::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Filters transactions and sums their amounts per date.
///
/// # Example
/// ```
/// use stockcast::core::{SalesFilter, Transaction};
/// use stockcast::data::TimeSeriesAggregator;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
/// let rows = vec![
///     Transaction::new(day, "Furniture", "Chairs", 10.0).unwrap(),
///     Transaction::new(day, "Furniture", "Chairs", 20.0).unwrap(),
/// ];
/// let series = TimeSeriesAggregator::new()
///     .aggregate(&rows, &SalesFilter::all())
///     .unwrap();
/// assert_eq!(series.values(), &[30.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesAggregator {
    gap_policy: GapPolicy,
}

impl TimeSeriesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how dates without transactions are represented.
    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    pub fn gap_policy(&self) -> GapPolicy {
        self.gap_policy
    }

    /// Aggregate the transactions passing `filter` into a daily series.
    ///
    /// An empty selection yields an empty series.
    pub fn aggregate<'a, I>(&self, transactions: I, filter: &SalesFilter) -> Result<DailySeries>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        if filter.is_empty_selection() {
            debug!("empty sub-category selection");
            return Ok(DailySeries::empty());
        }

        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut matched = 0usize;
        for transaction in transactions.into_iter().filter(|t| filter.matches(t)) {
            *totals.entry(transaction.date()).or_insert(0.0) += transaction.amount();
            matched += 1;
        }

        let series = DailySeries::from_pairs(totals.into_iter().collect())?;
        debug!(
            transactions = matched,
            days = series.len(),
            "aggregated daily series"
        );
        Ok(series.with_gap_policy(self.gap_policy))
    }
}
