//! Forecaster traits shared by demand models.

use crate::core::{DailySeries, ForecastRow};
use crate::error::Result;
use chrono::NaiveDate;

/// An unfitted model.
///
/// Fitting consumes nothing and returns a separate immutable value, so one
/// configured model can be fitted against many selections concurrently.
pub trait Forecaster {
    /// Parameters produced by a successful fit.
    type Fitted: FittedForecaster;

    /// Fit the model to a daily series.
    fn fit(&self, series: &DailySeries) -> Result<Self::Fitted>;
}

/// A fitted model that can be evaluated at arbitrary dates.
pub trait FittedForecaster: Send + Sync {
    /// Evaluate the model at each date, in the given order.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>>;

    /// Last date of the training series.
    fn last_observed(&self) -> NaiveDate;

    /// In-sample predictions, aligned with the training series.
    fn fitted_values(&self) -> &[f64];

    /// Actual minus fitted, aligned with the training series.
    fn residuals(&self) -> &[f64];

    fn name(&self) -> &str;
}
