//! Additive trend + yearly + weekly model for daily demand.
//!
//! The model decomposes a daily series as
//!
//! ```text
//! y(t) = trend(t) + yearly(t) + weekly(t) + noise
//! ```
//!
//! - `trend` is piecewise linear with evenly spaced changepoints whose rate
//!   changes are shrunk towards zero, which keeps the curve smooth.
//! - `yearly` and `weekly` are truncated Fourier series anchored to the
//!   calendar, so they evaluate to the same offset for the same
//!   day-of-year / day-of-week however far ahead the date is.
//!
//! All components are estimated jointly by penalized least squares on the
//! observed dates only, so irregular spacing needs no special handling.
//! Fitting is closed form and fully deterministic.
//!
//! The uncertainty band combines observation noise with trend drift:
//!
//! ```text
//! var(h) = sigma^2 * (1 + h / span) + (drift * h)^2
//! ```
//!
//! where `h` is the number of days past the last observation. `sigma` is the
//! residual standard deviation, floored at a tenth of the series' standard
//! deviation so that a selection the basis interpolates exactly still gets
//! a band. `drift` is the mean absolute changepoint rate change per day,
//! floored at one `sigma` of level change over the observed span. The band
//! is symmetric and non-decreasing in `h`.

use crate::core::{DailySeries, ForecastRow};
use crate::error::{ForecastError, Result};
use crate::models::trend::TrendBasis;
use crate::models::{FittedForecaster, Forecaster};
use crate::seasonality::FourierSeasonality;
use crate::utils::ols::{dot, ridge_fit};
use crate::utils::stats::{abs_max, std_dev, z_for_interval};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Penalty that effectively freezes changepoints in the noise-estimation pass.
const FROZEN_CHANGEPOINT_PENALTY: f64 = 1e6;
/// Lower bound on the scaled noise variance used to derive penalties.
const MIN_SCALED_VARIANCE: f64 = 1e-4;
/// Residual scale floor as a fraction of the series' standard deviation.
const SIGMA_FLOOR_FRACTION: f64 = 0.1;

/// Settings for [`SeasonalTrendModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalTrendConfig {
    /// Maximum number of trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints are placed.
    pub changepoint_range: f64,
    /// Prior scale of changepoint rate changes; smaller is smoother.
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients.
    pub seasonality_prior_scale: f64,
    /// Fourier order of the yearly cycle (0 disables it).
    pub yearly_order: usize,
    /// Fourier order of the weekly cycle (0 disables it, max 3).
    pub weekly_order: usize,
    /// Minimum observed span before the weekly cycle is fitted.
    pub min_weekly_span_days: i64,
    /// Minimum observed span before the yearly cycle is fitted.
    pub min_yearly_span_days: i64,
    /// Central coverage of the uncertainty band.
    pub interval_width: f64,
}

impl Default for SeasonalTrendConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_order: 10,
            weekly_order: 3,
            min_weekly_span_days: 14,
            min_yearly_span_days: 180,
            interval_width: 0.8,
        }
    }
}

impl SeasonalTrendConfig {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidInput(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.changepoint_prior_scale > 0.0 && self.changepoint_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidInput(
                "changepoint_prior_scale must be positive".into(),
            ));
        }
        if !(self.seasonality_prior_scale > 0.0 && self.seasonality_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidInput(
                "seasonality_prior_scale must be positive".into(),
            ));
        }
        if self.min_weekly_span_days < 0 || self.min_yearly_span_days < 0 {
            return Err(ForecastError::InvalidInput(
                "minimum spans must not be negative".into(),
            ));
        }
        z_for_interval(self.interval_width)?;
        Ok(())
    }

    pub fn with_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_seasonality_prior_scale(mut self, scale: f64) -> Self {
        self.seasonality_prior_scale = scale;
        self
    }

    pub fn with_yearly_order(mut self, order: usize) -> Self {
        self.yearly_order = order;
        self
    }

    pub fn with_weekly_order(mut self, order: usize) -> Self {
        self.weekly_order = order;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }
}

/// Unfitted additive model.
///
/// # Example
/// ```
/// use stockcast::core::DailySeries;
/// use stockcast::models::{FittedForecaster, Forecaster, SeasonalTrendModel};
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
/// let dates: Vec<_> = (0..60).map(|i| start + Duration::days(i)).collect();
/// let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
/// let series = DailySeries::new(dates, values).unwrap();
///
/// let fitted = SeasonalTrendModel::default().fit(&series).unwrap();
/// let rows = fitted.predict(&[start + Duration::days(70)]).unwrap();
/// assert!(rows[0].yhat_lower <= rows[0].yhat && rows[0].yhat <= rows[0].yhat_upper);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeasonalTrendModel {
    config: SeasonalTrendConfig,
}

impl SeasonalTrendModel {
    pub fn new(config: SeasonalTrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeasonalTrendConfig {
        &self.config
    }

    fn seasonality_for(
        &self,
        name: &str,
        order: usize,
        min_span: i64,
        span: i64,
        make: fn(usize) -> FourierSeasonality,
    ) -> Option<FourierSeasonality> {
        if order == 0 {
            return None;
        }
        if span < min_span {
            warn!(
                component = name,
                span_days = span,
                required_days = min_span,
                "span too short, seasonal component set to zero"
            );
            return None;
        }
        Some(make(order))
    }
}

impl Forecaster for SeasonalTrendModel {
    type Fitted = FittedModel;

    #[instrument(skip_all, fields(observations = series.len()))]
    fn fit(&self, series: &DailySeries) -> Result<FittedModel> {
        self.config.validate()?;

        let n = series.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }

        let dates = series.dates();
        let values = series.values();
        let span = series.span_days();

        let y_scale = match abs_max(values) {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        let y: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let trend = TrendBasis::from_dates(
            dates,
            self.config.n_changepoints,
            self.config.changepoint_range,
        );
        let yearly = self.seasonality_for(
            "yearly",
            self.config.yearly_order,
            self.config.min_yearly_span_days,
            span,
            FourierSeasonality::yearly,
        );
        let weekly = self.seasonality_for(
            "weekly",
            self.config.weekly_order,
            self.config.min_weekly_span_days,
            span,
            FourierSeasonality::weekly,
        );

        let layout = Layout::new(&trend, yearly.as_ref(), weekly.as_ref());
        let x: Vec<Vec<f64>> = dates
            .iter()
            .map(|&d| layout.features(&trend, yearly.as_ref(), weekly.as_ref(), d))
            .collect();

        // Pass 1: frozen changepoints, estimates the noise level.
        let seasonal_penalty = 1.0 / self.config.seasonality_prior_scale.powi(2);
        let first = ridge_fit(
            &x,
            &y,
            &layout.penalties(FROZEN_CHANGEPOINT_PENALTY, seasonal_penalty),
        )?;
        let noise = (first.sse() / n as f64).max(MIN_SCALED_VARIANCE);

        // Pass 2: penalties follow the prior scales relative to the noise.
        let changepoint_penalty = noise / self.config.changepoint_prior_scale.powi(2);
        let seasonal_penalty = noise / self.config.seasonality_prior_scale.powi(2);
        let fit = ridge_fit(
            &x,
            &y,
            &layout.penalties(changepoint_penalty, seasonal_penalty),
        )?;

        let coefficients: Vec<f64> = fit.coefficients.iter().map(|b| b * y_scale).collect();
        let fitted: Vec<f64> = fit.fitted.iter().map(|f| f * y_scale).collect();
        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(a, f)| a - f).collect();

        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let sigma = (sse / (n - 1) as f64)
            .sqrt()
            .max(SIGMA_FLOOR_FRACTION * std_dev(values));

        let deltas = &coefficients[2..layout.trend_end];
        let changepoint_drift = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64 / trend.span_days()
        };
        let drift = changepoint_drift.max(sigma / trend.span_days());

        let z = z_for_interval(self.config.interval_width)?;

        if !sigma.is_finite() || !drift.is_finite() {
            return Err(ForecastError::ModelFit(
                "non-finite residual scale".into(),
            ));
        }

        debug!(
            changepoints = trend.changepoints().len(),
            yearly = yearly.is_some(),
            weekly = weekly.is_some(),
            sigma,
            drift,
            "fitted seasonal trend model"
        );

        Ok(FittedModel {
            trend,
            yearly,
            weekly,
            layout,
            coefficients,
            sigma,
            drift,
            z,
            last_observed: dates[n - 1],
            fitted,
            residuals,
        })
    }
}

/// Column ranges of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Layout {
    trend_end: usize,
    yearly_end: usize,
    weekly_end: usize,
}

impl Layout {
    fn new(
        trend: &TrendBasis,
        yearly: Option<&FourierSeasonality>,
        weekly: Option<&FourierSeasonality>,
    ) -> Self {
        let trend_end = trend.columns();
        let yearly_end = trend_end + yearly.map_or(0, |s| s.columns());
        let weekly_end = yearly_end + weekly.map_or(0, |s| s.columns());
        Self {
            trend_end,
            yearly_end,
            weekly_end,
        }
    }

    fn features(
        &self,
        trend: &TrendBasis,
        yearly: Option<&FourierSeasonality>,
        weekly: Option<&FourierSeasonality>,
        date: NaiveDate,
    ) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.weekly_end);
        trend.extend_features(date, &mut row);
        if let Some(s) = yearly {
            s.extend_features(date, &mut row);
        }
        if let Some(s) = weekly {
            s.extend_features(date, &mut row);
        }
        row
    }

    fn penalties(&self, changepoint: f64, seasonal: f64) -> Vec<f64> {
        (0..self.weekly_end)
            .map(|j| match j {
                0 | 1 => 0.0,
                j if j < self.trend_end => changepoint,
                _ => seasonal,
            })
            .collect()
    }
}

/// Parameters learned by [`SeasonalTrendModel::fit`].
///
/// Immutable: a new selection or new data means a new fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    trend: TrendBasis,
    yearly: Option<FourierSeasonality>,
    weekly: Option<FourierSeasonality>,
    layout: Layout,
    /// Coefficients in the units of the series.
    coefficients: Vec<f64>,
    sigma: f64,
    drift: f64,
    z: f64,
    last_observed: NaiveDate,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedModel {
    /// Residual standard deviation.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Mean absolute trend rate change per day.
    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn has_yearly(&self) -> bool {
        self.yearly.is_some()
    }

    pub fn has_weekly(&self) -> bool {
        self.weekly.is_some()
    }

    /// Trend value at a date.
    pub fn trend_at(&self, date: NaiveDate) -> f64 {
        let mut row = Vec::with_capacity(self.layout.trend_end);
        self.trend.extend_features(date, &mut row);
        dot(&row, &self.coefficients[..self.layout.trend_end])
    }

    /// Yearly component at a date, 0 when not fitted.
    pub fn yearly_at(&self, date: NaiveDate) -> f64 {
        match &self.yearly {
            Some(s) => dot(
                &s.features(date),
                &self.coefficients[self.layout.trend_end..self.layout.yearly_end],
            ),
            None => 0.0,
        }
    }

    /// Weekly component at a date, 0 when not fitted.
    pub fn weekly_at(&self, date: NaiveDate) -> f64 {
        match &self.weekly {
            Some(s) => dot(
                &s.features(date),
                &self.coefficients[self.layout.yearly_end..self.layout.weekly_end],
            ),
            None => 0.0,
        }
    }

    /// Half width of the uncertainty band `h` days after the last observation.
    pub fn half_width(&self, days_ahead: i64) -> f64 {
        let h = days_ahead.max(0) as f64;
        let variance =
            self.sigma.powi(2) * (1.0 + h / self.trend.span_days()) + (self.drift * h).powi(2);
        self.z * variance.sqrt()
    }

    fn row(&self, date: NaiveDate) -> ForecastRow {
        let trend = self.trend_at(date);
        let yearly = self.yearly_at(date);
        let weekly = self.weekly_at(date);
        let yhat = trend + yearly + weekly;
        let half = self.half_width((date - self.last_observed).num_days());
        ForecastRow {
            date,
            yhat,
            yhat_lower: yhat - half,
            yhat_upper: yhat + half,
            trend,
            yearly,
            weekly,
        }
    }
}

impl FittedForecaster for FittedModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>> {
        dates
            .iter()
            .map(|&date| {
                let row = self.row(date);
                if row.yhat_lower.is_finite() && row.yhat_upper.is_finite() {
                    Ok(row)
                } else {
                    Err(ForecastError::ModelFit(format!(
                        "non-finite forecast on {}",
                        date
                    )))
                }
            })
            .collect()
    }

    fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        "SeasonalTrend"
    }
}
