//! Ordinary Least Squares (OLS) regression over ordered feature rows.
//!
//! Backs the linear regression used to combine ensemble forecasts. Solves
//! the normal equations with a Cholesky decomposition; a small ridge term on
//! the diagonal keeps near-collinear feature sets solvable.

use crate::error::{ForecastError, Result};

/// Fitted OLS coefficients.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Intercept term (0 when fit without intercept).
    pub intercept: f64,
    /// One coefficient per feature, in input column order.
    pub coefficients: Vec<f64>,
}

impl OlsFit {
    /// Number of features the fit expects.
    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per feature row.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let mut predictions = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != self.coefficients.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.coefficients.len(),
                    got: row.len(),
                });
            }
            let dot: f64 = row
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, c)| x * c)
                .sum();
            predictions.push(self.intercept + dot);
        }
        Ok(predictions)
    }
}

/// Fit OLS: targets = [intercept +] rows @ coefficients.
///
/// `rows` holds one feature row per observation; all rows must have the same
/// width and there must be one target per row.
pub fn ols_fit(targets: &[f64], rows: &[Vec<f64>], intercept: bool) -> Result<OlsFit> {
    let n = targets.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if rows.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: rows.len(),
        });
    }

    let k = rows[0].len();
    for row in rows {
        if row.len() != k {
            return Err(ForecastError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }
    }

    if k == 0 {
        // No features: the best constant fit is the target mean (or zero
        // when the intercept is suppressed).
        let value = if intercept {
            targets.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };
        return Ok(OlsFit {
            intercept: value,
            coefficients: vec![],
        });
    }

    // Number of parameters: optional intercept column plus one per feature.
    let offset = usize::from(intercept);
    let num_params = k + offset;

    // Accumulate X'X and X'y over observations.
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for (row, &y) in rows.iter().zip(targets.iter()) {
        if intercept {
            xtx[0][0] += 1.0;
            for j in 0..k {
                xtx[0][j + 1] += row[j];
                xtx[j + 1][0] += row[j];
            }
            xty[0] += y;
        }
        for i in 0..k {
            for j in 0..k {
                xtx[i + offset][j + offset] += row[i] * row[j];
            }
            xty[i + offset] += row[i] * y;
        }
    }

    // Ridge term for numerical stability
    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError("OLS normal equations are not positive definite".into())
    })?;

    Ok(OlsFit {
        intercept: if intercept { beta[0] } else { 0.0 },
        coefficients: beta[offset..].to_vec(),
    })
}

/// Solve a symmetric positive definite system via Cholesky decomposition.
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
                if sum <= 0.0 {
                    return None; // Not positive definite
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
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

    #[test]
    fn ols_fit_simple_linear() {
        // y = 2 + 3*x
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let rows: Vec<Vec<f64>> = (1..=5).map(|i| vec![i as f64]).collect();

        let fit = ols_fit(&y, &rows, true).unwrap();

        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-6);
        assert_eq!(fit.coefficients.len(), 1);
        assert_relative_eq!(fit.coefficients[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn ols_fit_without_intercept() {
        // y = 0.5*x1 + 2*x2, no intercept
        let rows = vec![
            vec![1.0, 0.5],
            vec![2.0, 2.5],
            vec![3.0, 1.0],
            vec![4.0, 3.0],
            vec![5.0, 1.5],
        ];
        let y: Vec<f64> = rows.iter().map(|r| 0.5 * r[0] + 2.0 * r[1]).collect();

        let fit = ols_fit(&y, &rows, false).unwrap();

        assert_eq!(fit.intercept, 0.0);
        assert_relative_eq!(fit.coefficients[0], 0.5, epsilon = 1e-5);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn ols_fit_multiple_regressors() {
        // y = 1 + 2*x1 + 3*x2, non-collinear regressors
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = [0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let rows: Vec<Vec<f64>> = x1.iter().zip(x2.iter()).map(|(&a, &b)| vec![a, b]).collect();
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[0] + 3.0 * r[1]).collect();

        let fit = ols_fit(&y, &rows, true).unwrap();

        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-4);
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn ols_fit_no_features_returns_mean() {
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let rows = vec![vec![]; 5];

        let fit = ols_fit(&y, &rows, true).unwrap();
        assert_relative_eq!(fit.intercept, 6.0, epsilon = 1e-10);
        assert!(fit.coefficients.is_empty());

        let fit = ols_fit(&y, &rows, false).unwrap();
        assert_eq!(fit.intercept, 0.0);
    }

    #[test]
    fn ols_predict_applies_coefficients() {
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let rows: Vec<Vec<f64>> = (1..=5).map(|i| vec![i as f64]).collect();
        let fit = ols_fit(&y, &rows, true).unwrap();

        let predictions = fit
            .predict(&[vec![6.0], vec![7.0], vec![8.0]])
            .unwrap();

        assert_eq!(predictions.len(), 3);
        assert_relative_eq!(predictions[0], 20.0, epsilon = 1e-6); // 2 + 3*6
        assert_relative_eq!(predictions[1], 23.0, epsilon = 1e-6); // 2 + 3*7
        assert_relative_eq!(predictions[2], 26.0, epsilon = 1e-6); // 2 + 3*8
    }

    #[test]
    fn ols_rejects_mismatched_dimensions() {
        let y = vec![1.0, 2.0, 3.0];
        assert!(ols_fit(&y, &[vec![1.0], vec![2.0]], true).is_err());
        assert!(ols_fit(&y, &[vec![1.0], vec![2.0, 9.0], vec![3.0]], true).is_err());

        let fit = ols_fit(&y, &[vec![1.0], vec![2.0], vec![3.0]], true).unwrap();
        assert!(fit.predict(&[vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn ols_with_noise_recovers_coefficients() {
        let n = 100;
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64 * 0.1]).collect();
        let y: Vec<f64> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| 2.5 + 1.7 * r[0] + (i as f64 * 0.13).sin() * 0.1)
            .collect();

        let fit = ols_fit(&y, &rows, true).unwrap();

        assert_relative_eq!(fit.intercept, 2.5, epsilon = 0.1);
        assert_relative_eq!(fit.coefficients[0], 1.7, epsilon = 0.1);
    }
}
