//! Statistical utility functions.

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for a central interval.
///
/// `z_for_interval(0.95)` is about 1.96.
///
/// # Example
/// ```
/// use stockcast::utils::z_for_interval;
///
/// let z = z_for_interval(0.95).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn z_for_interval(width: f64) -> Result<f64> {
    if !(width > 0.0 && width < 1.0) {
        return Err(ForecastError::InvalidInput(format!(
            "interval width must be in (0, 1), got {}",
            width
        )));
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::ModelFit(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

/// Sample standard deviation (n-1 denominator), 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Largest absolute value, 0 for an empty slice.
pub fn abs_max(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}
