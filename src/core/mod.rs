//! Core data structures: transactions, daily series and forecast rows.

mod daily_series;
mod forecast;
mod transaction;

pub use daily_series::{DailySeries, GapPolicy};
pub use forecast::{ForecastRow, ForecastTable};
pub use transaction::{SalesFilter, Transaction, ALL_CATEGORIES};
