//! Piecewise-linear trend basis with fixed changepoints.
//!
//! Time is rescaled to `s = (date - origin) / span` so the observed history
//! covers `[0, 1]`. The basis for one date is
//! `[1, s, (s - c_1)+, ..., (s - c_k)+]`: an intercept, a base growth rate
//! and one hinge per changepoint. Beyond the last observation the trend
//! continues with its final slope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Design-matrix generator for the trend component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBasis {
    origin: NaiveDate,
    span_days: f64,
    changepoints: Vec<f64>,
}

impl TrendBasis {
    /// Place up to `n_changepoints` changepoints at evenly spaced
    /// observations within the first `range` fraction of the history.
    ///
    /// `dates` must be sorted and contain at least two distinct dates.
    pub fn from_dates(dates: &[NaiveDate], n_changepoints: usize, range: f64) -> Self {
        let origin = dates.first().copied().unwrap_or_default();
        let last = dates.last().copied().unwrap_or(origin);
        let span_days = ((last - origin).num_days() as f64).max(1.0);

        let scaled = |d: NaiveDate| (d - origin).num_days() as f64 / span_days;

        let history = ((dates.len() as f64) * range).floor() as usize;
        let n_changepoints = n_changepoints.min(history.saturating_sub(1));

        let mut changepoints: Vec<f64> = Vec::with_capacity(n_changepoints);
        if n_changepoints > 0 {
            let last_idx = (history - 1) as f64;
            for i in 1..=n_changepoints {
                let idx = (last_idx * i as f64 / n_changepoints as f64).round() as usize;
                let cp = scaled(dates[idx]);
                if cp > 0.0 && changepoints.last().map_or(true, |&prev| cp > prev) {
                    changepoints.push(cp);
                }
            }
        }

        Self {
            origin,
            span_days,
            changepoints,
        }
    }

    pub fn span_days(&self) -> f64 {
        self.span_days
    }

    /// Changepoint locations in scaled time.
    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    /// Number of design columns.
    pub fn columns(&self) -> usize {
        2 + self.changepoints.len()
    }

    /// Scaled time of a date.
    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.span_days
    }

    /// Append the basis values for `date` to `out`.
    pub fn extend_features(&self, date: NaiveDate, out: &mut Vec<f64>) {
        let s = self.scaled_time(date);
        out.push(1.0);
        out.push(s);
        out.extend(self.changepoints.iter().map(|&c| (s - c).max(0.0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn daily(n: i64) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        (0..n).map(|i| start + Duration::days(i)).collect()
    }

    #[test]
    fn changepoints_cover_leading_history() {
        let dates = daily(101);
        let basis = TrendBasis::from_dates(&dates, 25, 0.8);

        assert_eq!(basis.changepoints().len(), 25);
        assert_eq!(basis.columns(), 27);
        assert!(basis.changepoints().iter().all(|&c| c > 0.0 && c < 0.8));
        assert!(basis.changepoints().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn short_history_limits_changepoints() {
        let basis = TrendBasis::from_dates(&daily(2), 25, 0.8);
        assert!(basis.changepoints().is_empty());
        assert_eq!(basis.columns(), 2);

        let basis = TrendBasis::from_dates(&daily(6), 25, 0.8);
        assert!(basis.changepoints().len() <= 3);
    }

    #[test]
    fn scaled_time_spans_unit_interval() {
        let dates = daily(11);
        let basis = TrendBasis::from_dates(&dates, 0, 0.8);
        assert_relative_eq!(basis.scaled_time(dates[0]), 0.0);
        assert_relative_eq!(basis.scaled_time(dates[10]), 1.0);
        assert_relative_eq!(basis.scaled_time(dates[10] + Duration::days(5)), 1.5);
    }

    #[test]
    fn hinge_features_are_zero_before_changepoint() {
        let dates = daily(51);
        let basis = TrendBasis::from_dates(&dates, 4, 0.8);
        let mut row = Vec::new();
        basis.extend_features(dates[0], &mut row);
        assert_eq!(row.len(), basis.columns());
        assert_eq!(row[0], 1.0);
        assert!(row[2..].iter().all(|&v| v == 0.0));

        row.clear();
        basis.extend_features(dates[50], &mut row);
        assert!(row[2..].iter().all(|&v| v > 0.0));
    }

    #[test]
    fn irregular_dates_use_calendar_distance() {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let dates = vec![start, start + Duration::days(3), start + Duration::days(30)];
        let basis = TrendBasis::from_dates(&dates, 0, 0.8);
        assert_relative_eq!(basis.scaled_time(dates[1]), 0.1);
    }
}
