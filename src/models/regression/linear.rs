//! Linear regression over feature rows.

use crate::error::{ForecastError, Result};
use crate::models::regression::Regressor;
use crate::utils::ols::{ols_fit, OlsFit};

/// Linear regression fitted by ordinary least squares.
///
/// The default configuration fits an intercept; `without_intercept` forces
/// the fit through the origin, which is the configuration used to combine
/// ensemble forecasts.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    intercept: bool,
    fit: Option<OlsFit>,
}

impl LinearRegression {
    /// Create a linear regression with an intercept term.
    pub fn new() -> Self {
        Self {
            intercept: true,
            fit: None,
        }
    }

    /// Create a linear regression without an intercept term.
    pub fn without_intercept() -> Self {
        Self {
            intercept: false,
            fit: None,
        }
    }

    /// Whether an intercept is fitted.
    pub fn has_intercept(&self) -> bool {
        self.intercept
    }

    /// The fitted coefficients, one per feature column.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coefficients.as_slice())
    }

    /// The fitted intercept.
    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        self.fit = Some(ols_fit(targets, rows, self.intercept)?);
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let fit = self.fit.as_ref().ok_or(ForecastError::FitRequired)?;
        fit.predict(rows)
    }

    fn fresh(&self) -> Box<dyn Regressor> {
        Box::new(Self {
            intercept: self.intercept,
            fit: None,
        })
    }

    fn name(&self) -> &str {
        "LinearRegression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_regression_learns_a_line() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 1.5 + 2.0 * r[0]).collect();

        let mut model = LinearRegression::new();
        model.fit(&rows, &targets).unwrap();

        assert_relative_eq!(model.intercept().unwrap(), 1.5, epsilon = 1e-6);
        assert_relative_eq!(model.coefficients().unwrap()[0], 2.0, epsilon = 1e-6);

        let predictions = model.predict(&[vec![20.0]]).unwrap();
        assert_relative_eq!(predictions[0], 41.5, epsilon = 1e-6);
    }

    #[test]
    fn without_intercept_forces_origin() {
        let rows: Vec<Vec<f64>> = (1..=10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 3.0 * r[0]).collect();

        let mut model = LinearRegression::without_intercept();
        model.fit(&rows, &targets).unwrap();

        assert_eq!(model.intercept().unwrap(), 0.0);
        assert_relative_eq!(model.coefficients().unwrap()[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn predict_requires_fit() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(ForecastError::FitRequired)
        ));
    }

    #[test]
    fn fresh_copy_is_unfitted_with_same_configuration() {
        let rows = vec![vec![1.0], vec![2.0]];
        let mut model = LinearRegression::without_intercept();
        model.fit(&rows, &[2.0, 4.0]).unwrap();

        let copy = model.fresh();
        assert!(matches!(
            copy.predict(&[vec![1.0]]),
            Err(ForecastError::FitRequired)
        ));
    }
}
