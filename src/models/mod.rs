//! Forecasting models.

mod traits;

pub mod seasonal_trend;
pub mod trend;

pub use seasonal_trend::{FittedModel, SeasonalTrendConfig, SeasonalTrendModel};
pub use traits::{FittedForecaster, Forecaster};
pub use trend::TrendBasis;
