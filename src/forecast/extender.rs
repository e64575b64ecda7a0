//! Extension of a fitted model past the last observation.

use crate::core::{DailySeries, ForecastTable};
use crate::error::{ForecastError, Result};
use crate::models::FittedForecaster;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of days to forecast past the last observation. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Horizon(u32);

impl Horizon {
    /// Validate a horizon in days.
    pub fn new(days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(ForecastError::InvalidInput(format!(
                "horizon must be a positive number of days, got {}",
                days
            )));
        }
        u32::try_from(days).map(Self).map_err(|_| {
            ForecastError::InvalidInput(format!("horizon of {} days is too long", days))
        })
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Horizon {
    type Error = ForecastError;

    fn try_from(days: i64) -> Result<Self> {
        Self::new(days)
    }
}

impl From<Horizon> for i64 {
    fn from(h: Horizon) -> i64 {
        i64::from(h.0)
    }
}

/// Builds the evaluation dates for a forecast and runs them through a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastExtender;

impl ForecastExtender {
    pub fn new() -> Self {
        Self
    }

    /// The `horizon_days` consecutive dates following `last_observed`.
    ///
    /// # Example
    /// ```
    /// use stockcast::forecast::ForecastExtender;
    /// use chrono::NaiveDate;
    ///
    /// let last = NaiveDate::from_ymd_opt(2018, 12, 30).unwrap();
    /// let dates = ForecastExtender::new().extend(last, 3).unwrap();
    /// assert_eq!(dates[2], NaiveDate::from_ymd_opt(2019, 1, 2).unwrap());
    /// assert!(ForecastExtender::new().extend(last, 0).is_err());
    /// ```
    pub fn extend(&self, last_observed: NaiveDate, horizon_days: i64) -> Result<Vec<NaiveDate>> {
        let horizon = Horizon::new(horizon_days)?;
        self.future_dates(last_observed, horizon)
    }

    fn future_dates(&self, last_observed: NaiveDate, horizon: Horizon) -> Result<Vec<NaiveDate>> {
        (1..=i64::from(horizon.days()))
            .map(|i| {
                last_observed
                    .checked_add_signed(Duration::days(i))
                    .ok_or_else(|| {
                        ForecastError::InvalidInput(format!(
                            "horizon of {} days from {} is past the last representable date",
                            horizon.days(),
                            last_observed
                        ))
                    })
            })
            .collect()
    }

    /// Evaluate `model` on the observed dates of `history` followed by the
    /// future horizon.
    pub fn forecast<M>(
        &self,
        model: &M,
        history: &DailySeries,
        horizon: Horizon,
    ) -> Result<ForecastTable>
    where
        M: FittedForecaster + ?Sized,
    {
        let last = model.last_observed();
        let mut dates: Vec<NaiveDate> = history
            .dates()
            .iter()
            .copied()
            .filter(|&d| d <= last)
            .collect();
        dates.extend(self.future_dates(last, horizon)?);

        let rows = model.predict(&dates)?;
        debug!(
            model = model.name(),
            historical = dates.len() - horizon.days() as usize,
            future = horizon.days(),
            "evaluated forecast table"
        );
        Ok(ForecastTable::new(rows, last))
    }
}
