//! Monthly safety-stock planning from future demand.

use crate::core::ForecastRow;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Share of estimated demand held as buffer stock, within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SafetyRatio(f64);

impl SafetyRatio {
    pub fn new(ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ForecastError::InvalidInput(format!(
                "safety ratio must be within [0, 1], got {}",
                ratio
            )));
        }
        Ok(Self(ratio))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SafetyRatio {
    fn default() -> Self {
        Self(0.2)
    }
}

impl TryFrom<f64> for SafetyRatio {
    type Error = ForecastError;

    fn try_from(ratio: f64) -> Result<Self> {
        Self::new(ratio)
    }
}

impl From<SafetyRatio> for f64 {
    fn from(r: SafetyRatio) -> f64 {
        r.0
    }
}

/// Calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Recommended stock for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub month: YearMonth,
    /// Sum of forecast demand over the month's future dates.
    pub estimated_demand: f64,
    pub safety_stock: f64,
    /// Always `estimated_demand + safety_stock`.
    pub ideal_stock: f64,
}

impl InventoryRow {
    fn new(month: YearMonth, estimated_demand: f64, ratio: SafetyRatio) -> Self {
        let safety_stock = estimated_demand * ratio.value();
        Self {
            month,
            estimated_demand,
            safety_stock,
            ideal_stock: estimated_demand + safety_stock,
        }
    }
}

/// Turns future forecast rows into monthly inventory rows.
///
/// Rows dated on or before the last observation are ignored. Months are
/// partial when the horizon starts or ends inside them; no pro-rating is
/// applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryPlanner;

impl InventoryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan with an unvalidated ratio.
    pub fn plan(
        &self,
        rows: &[ForecastRow],
        last_observed: NaiveDate,
        safety_ratio: f64,
    ) -> Result<Vec<InventoryRow>> {
        let ratio = SafetyRatio::new(safety_ratio)?;
        Ok(self.plan_with(rows, last_observed, ratio))
    }

    /// Plan with an already validated ratio. Output is ordered by month.
    pub fn plan_with(
        &self,
        rows: &[ForecastRow],
        last_observed: NaiveDate,
        ratio: SafetyRatio,
    ) -> Vec<InventoryRow> {
        let mut demand: BTreeMap<YearMonth, f64> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.date > last_observed) {
            *demand.entry(YearMonth::of(row.date)).or_insert(0.0) += row.yhat;
        }

        debug!(months = demand.len(), ratio = ratio.value(), "planned inventory");
        demand
            .into_iter()
            .map(|(month, total)| InventoryRow::new(month, total, ratio))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn row(date: NaiveDate, yhat: f64) -> ForecastRow {
        ForecastRow {
            date,
            yhat,
            yhat_lower: yhat - 1.0,
            yhat_upper: yhat + 1.0,
            trend: yhat,
            yearly: 0.0,
            weekly: 0.0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ratio_twenty_percent_of_thousand() {
        let last = date(2018, 12, 31);
        let rows: Vec<_> = (1..=10)
            .map(|i| row(last + Duration::days(i), 100.0))
            .collect();

        let plan = InventoryPlanner::new().plan(&rows, last, 0.20).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].month.to_string(), "2019-01");
        assert_relative_eq!(plan[0].estimated_demand, 1000.0);
        assert_relative_eq!(plan[0].safety_stock, 200.0);
        assert_relative_eq!(plan[0].ideal_stock, 1200.0);
    }

    #[test]
    fn history_rows_are_excluded_and_months_split() {
        let last = date(2018, 1, 20);
        let rows: Vec<_> = (0..30)
            .map(|i| row(date(2018, 1, 10) + Duration::days(i), 1.0))
            .collect();

        let plan = InventoryPlanner::new().plan(&rows, last, 0.5).unwrap();
        assert_eq!(plan.len(), 2);
        // Jan 21..=31 and Feb 1..=8.
        assert_relative_eq!(plan[0].estimated_demand, 11.0);
        assert_relative_eq!(plan[1].estimated_demand, 8.0);
        assert_eq!(plan[1].month, YearMonth { year: 2018, month: 2 });
        for r in &plan {
            assert_relative_eq!(r.ideal_stock, r.estimated_demand + r.safety_stock);
        }
    }

    #[test]
    fn ratio_outside_unit_interval_is_rejected() {
        let last = date(2018, 1, 1);
        for bad in [-0.1, 1.01, f64::NAN] {
            assert!(matches!(
                InventoryPlanner::new().plan(&[], last, bad),
                Err(ForecastError::InvalidInput(_))
            ));
        }
        assert!(SafetyRatio::new(0.0).is_ok());
        assert!(SafetyRatio::new(1.0).is_ok());
    }

    #[test]
    fn empty_future_gives_empty_plan() {
        let last = date(2018, 3, 1);
        let rows = vec![row(date(2018, 2, 1), 5.0), row(last, 5.0)];
        assert!(InventoryPlanner::new().plan(&rows, last, 0.2).unwrap().is_empty());
    }

    #[test]
    fn zero_ratio_keeps_demand_as_ideal() {
        let last = date(2018, 3, 1);
        let rows = vec![row(date(2018, 3, 2), 42.0)];
        let plan = InventoryPlanner::new().plan(&rows, last, 0.0).unwrap();
        assert_relative_eq!(plan[0].safety_stock, 0.0);
        assert_relative_eq!(plan[0].ideal_stock, 42.0);
    }
}
