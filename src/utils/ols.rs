//! Penalized least squares used to fit the additive model's basis.
//!
//! Solves `min ||y - X b||^2 + sum_j penalty_j * b_j^2` through the normal
//! equations and a Cholesky factorization. A zero penalty leaves a column
//! unregularized (plain OLS for that coefficient).

use crate::error::{ForecastError, Result};

/// Diagonal jitter added to the normal equations for numerical stability.
const JITTER: f64 = 1e-8;

/// Fitted coefficients with in-sample diagnostics.
#[derive(Debug, Clone)]
pub struct RidgeResult {
    /// One coefficient per design column.
    pub coefficients: Vec<f64>,
    /// In-sample fitted values.
    pub fitted: Vec<f64>,
    /// Residuals (y - fitted).
    pub residuals: Vec<f64>,
}

impl RidgeResult {
    /// Residual sum of squares.
    pub fn sse(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }
}

/// Dot product of a design row with a coefficient vector.
pub fn dot(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(x, b)| x * b).sum()
}

/// Fit penalized least squares.
///
/// # Arguments
/// * `x` - Design matrix, one row per observation
/// * `y` - Target values
/// * `penalties` - Non-negative ridge penalty per column
pub fn ridge_fit(x: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<RidgeResult> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if x.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: x.len(),
        });
    }

    let p = penalties.len();
    if let Some(row) = x.iter().find(|row| row.len() != p) {
        return Err(ForecastError::DimensionMismatch {
            expected: p,
            got: row.len(),
        });
    }
    if penalties.iter().any(|&l| !l.is_finite() || l < 0.0) {
        return Err(ForecastError::InvalidInput(
            "ridge penalties must be finite and non-negative".into(),
        ));
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for (row, &y_obs) in x.iter().zip(y) {
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            xty[i] += xi * y_obs;
            for j in 0..=i {
                xtx[i][j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        xtx[i][i] += penalties[i] + JITTER;
    }

    let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ModelFit("normal equations are not positive definite".into())
    })?;
    if coefficients.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::ModelFit(
            "non-finite regression coefficients".into(),
        ));
    }

    let fitted: Vec<f64> = x.iter().map(|row| dot(row, &coefficients)).collect();
    let residuals = y.iter().zip(&fitted).map(|(a, f)| a - f).collect();

    Ok(RidgeResult {
        coefficients,
        fitted,
        residuals,
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L @ L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn design(xs: &[f64]) -> Vec<Vec<f64>> {
        xs.iter().map(|&x| vec![1.0, x]).collect()
    }

    #[test]
    fn unpenalized_fit_recovers_line() {
        // y = 2 + 3*x
        let x = design(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];

        let result = ridge_fit(&x, &y, &[0.0, 0.0]).unwrap();

        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(result.coefficients[1], 3.0, epsilon = 1e-6);
        assert!(result.sse() < 1e-8);
    }

    #[test]
    fn penalty_shrinks_coefficient() {
        let x = design(&[0.0, 1.0, 2.0, 3.0]);
        let y = vec![0.0, 1.0, 2.0, 3.0];

        let free = ridge_fit(&x, &y, &[0.0, 0.0]).unwrap();
        let shrunk = ridge_fit(&x, &y, &[0.0, 100.0]).unwrap();

        assert!(shrunk.coefficients[1].abs() < free.coefficients[1].abs());
        assert!(shrunk.sse() > free.sse());
    }

    #[test]
    fn penalty_makes_collinear_design_solvable() {
        // Two identical columns: singular without a penalty on one of them.
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![1.0, i as f64, i as f64]).collect();
        let y: Vec<f64> = (0..6).map(|i| 1.0 + 2.0 * i as f64).collect();

        let result = ridge_fit(&x, &y, &[0.0, 1e-3, 1e-3]).unwrap();
        assert_relative_eq!(
            result.coefficients[1] + result.coefficients[2],
            2.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn residuals_sum_to_zero_with_intercept() {
        let x = design(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = vec![5.1, 7.9, 11.2, 13.8, 17.0];

        let result = ridge_fit(&x, &y, &[0.0, 0.0]).unwrap();
        let sum: f64 = result.residuals.iter().sum();
        assert!(sum.abs() < 1e-6);
        assert_eq!(result.fitted.len(), 5);
    }

    #[test]
    fn rejects_bad_dimensions_and_penalties() {
        let x = design(&[1.0, 2.0]);
        assert!(matches!(
            ridge_fit(&x, &[1.0], &[0.0, 0.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ridge_fit(&x, &[1.0, 2.0], &[0.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(ridge_fit(&x, &[1.0, 2.0], &[0.0, -1.0]).is_err());
        assert!(matches!(
            ridge_fit(&[], &[], &[]),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn solve_symmetric_rejects_indefinite() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        assert!(solve_symmetric(&a, &[1.0, 1.0]).is_none());
        assert!(solve_symmetric(&[], &[]).is_none());
    }
}
