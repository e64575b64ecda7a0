//! Mean seasonal component per day-of-week and per month-of-year.

use crate::core::ForecastRow;
use chrono::{Datelike, Month, Weekday};
use serde::Serialize;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Mean component value of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileEntry<K> {
    pub key: K,
    /// `None` when no evaluated date fell into the bucket.
    pub mean: Option<f64>,
    pub count: usize,
}

/// Ordered buckets of a seasonal component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalProfile<K> {
    entries: Vec<ProfileEntry<K>>,
}

impl<K: Copy + PartialEq> SeasonalProfile<K> {
    fn build<F>(keys: &[K], rows: &[ForecastRow], bucket: F) -> Self
    where
        F: Fn(&ForecastRow) -> (usize, f64),
    {
        let mut sums = vec![0.0; keys.len()];
        let mut counts = vec![0usize; keys.len()];
        for row in rows {
            let (idx, value) = bucket(row);
            sums[idx] += value;
            counts[idx] += 1;
        }

        let entries = keys
            .iter()
            .zip(sums.iter().zip(&counts))
            .map(|(&key, (&sum, &count))| ProfileEntry {
                key,
                mean: (count > 0).then(|| sum / count as f64),
                count,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ProfileEntry<K>] {
        &self.entries
    }

    /// Mean for one key.
    pub fn get(&self, key: K) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.mean)
    }
}

/// Weekly component averaged per day of week, Monday first.
pub fn weekly_profile(rows: &[ForecastRow]) -> SeasonalProfile<Weekday> {
    SeasonalProfile::build(&WEEKDAYS, rows, |row| {
        (row.date.weekday().num_days_from_monday() as usize, row.weekly)
    })
}

/// Yearly component averaged per calendar month, January first.
pub fn yearly_profile(rows: &[ForecastRow]) -> SeasonalProfile<Month> {
    SeasonalProfile::build(&MONTHS, rows, |row| (row.date.month0() as usize, row.yearly))
}
