//! Forecast rows and the table handed to the presentation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Model evaluation at one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    /// Point estimate: trend + yearly + weekly.
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub yearly: f64,
    pub weekly: f64,
}

impl ForecastRow {
    /// Width of the uncertainty interval.
    pub fn interval_width(&self) -> f64 {
        self.yhat_upper - self.yhat_lower
    }
}

/// Forecast rows covering the historical span and the future horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
    last_observed: Option<NaiveDate>,
}

impl ForecastTable {
    /// Create a table; rows are expected in ascending date order.
    pub fn new(rows: Vec<ForecastRow>, last_observed: NaiveDate) -> Self {
        Self {
            rows,
            last_observed: Some(last_observed),
        }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Latest observed date the forecast was extended from.
    pub fn last_observed(&self) -> Option<NaiveDate> {
        self.last_observed
    }

    /// Rows at or before the last observed date.
    pub fn historical(&self) -> &[ForecastRow] {
        &self.rows[..self.split_index()]
    }

    /// Rows strictly after the last observed date.
    pub fn future(&self) -> &[ForecastRow] {
        &self.rows[self.split_index()..]
    }

    fn split_index(&self) -> usize {
        match self.last_observed {
            Some(last) => self.rows.partition_point(|row| row.date <= last),
            None => self.rows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, yhat: f64) -> ForecastRow {
        ForecastRow {
            date: NaiveDate::from_ymd_opt(2018, 1, day).unwrap(),
            yhat,
            yhat_lower: yhat - 1.0,
            yhat_upper: yhat + 1.0,
            trend: yhat,
            yearly: 0.0,
            weekly: 0.0,
        }
    }

    #[test]
    fn forecast_table_splits_history_and_future() {
        let rows: Vec<_> = (1..=5).map(|d| row(d, d as f64)).collect();
        let table = ForecastTable::new(rows, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());

        assert_eq!(table.len(), 5);
        assert_eq!(table.historical().len(), 3);
        assert_eq!(table.future().len(), 2);
        assert_eq!(table.future()[0].date.to_string(), "2018-01-04");
    }

    #[test]
    fn empty_table_has_no_future() {
        let table = ForecastTable::default();
        assert!(table.is_empty());
        assert!(table.future().is_empty());
        assert!(table.historical().is_empty());
        assert_eq!(table.last_observed(), None);
    }

    #[test]
    fn interval_width_is_upper_minus_lower() {
        assert_eq!(row(1, 10.0).interval_width(), 2.0);
    }
}
