//! Fourier basis for fixed-period calendar cycles.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean length of a Gregorian year in days.
pub const YEAR_DAYS: f64 = 365.25;
/// Length of a week in days.
pub const WEEK_DAYS: f64 = 7.0;

/// A periodic component expressed as a truncated Fourier series.
///
/// The phase is anchored to the proleptic Gregorian day number, so the same
/// calendar date always maps to the same basis values, no matter which
/// series the component was fitted on or how far ahead the date lies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierSeasonality {
    period_days: f64,
    order: usize,
}

impl FourierSeasonality {
    pub fn new(period_days: f64, order: usize) -> Self {
        Self { period_days, order }
    }

    /// Yearly cycle.
    pub fn yearly(order: usize) -> Self {
        Self::new(YEAR_DAYS, order)
    }

    /// Weekly cycle. Orders above 3 are aliased for daily data and clamped.
    pub fn weekly(order: usize) -> Self {
        Self::new(WEEK_DAYS, order.min(3))
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of design columns (a cosine and a sine per harmonic).
    pub fn columns(&self) -> usize {
        2 * self.order
    }

    /// Append the basis values for `date` to `out`.
    pub fn extend_features(&self, date: NaiveDate, out: &mut Vec<f64>) {
        let t = date.num_days_from_ce() as f64;
        let phase = t.rem_euclid(self.period_days) / self.period_days;
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * phase;
            out.push(angle.cos());
            out.push(angle.sin());
        }
    }

    /// Basis values for `date`.
    pub fn features(&self, date: NaiveDate) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.columns());
        self.extend_features(date, &mut out);
        out
    }
}
