//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};

/// A forecast result containing point predictions.
///
/// Predictions are stored one column per dimension; univariate forecasts
/// have a single column. A `Forecast` carries no time axis of its own — the
/// caller anchors it to timestamps when needed.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    /// Point predictions: point[dimension][step]
    point: Vec<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a univariate forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: vec![values],
        }
    }

    /// Create a multivariate forecast from per-dimension columns.
    ///
    /// All columns must share the same horizon.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let horizon = first.len();
            for col in &columns {
                if col.len() != horizon {
                    return Err(ForecastError::DimensionMismatch {
                        expected: horizon,
                        got: col.len(),
                    });
                }
            }
        }
        Ok(Self { point: columns })
    }

    /// Get the number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.point.len()
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.first().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty() || self.point.iter().all(|s| s.is_empty())
    }

    /// Check if forecast is multivariate.
    pub fn is_multivariate(&self) -> bool {
        self.point.len() > 1
    }

    /// Get reference to a series.
    pub fn series(&self, dimension: usize) -> Result<&[f64]> {
        self.point
            .get(dimension)
            .map(|v| v.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index: dimension,
                size: self.point.len(),
            })
    }

    /// Get reference to the primary (first) series.
    pub fn primary(&self) -> &[f64] {
        self.point.first().map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Iterate over the per-dimension columns.
    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        self.point.iter().map(|c| c.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_from_values_is_univariate() {
        let fc = Forecast::from_values(vec![1.0, 2.0, 3.0]);

        assert_eq!(fc.dimensions(), 1);
        assert_eq!(fc.horizon(), 3);
        assert!(!fc.is_multivariate());
        assert_eq!(fc.primary(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn forecast_from_columns_validates_horizons() {
        let fc = Forecast::from_columns(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(fc.dimensions(), 2);
        assert_eq!(fc.horizon(), 2);
        assert_eq!(fc.series(1).unwrap(), &[3.0, 4.0]);

        let result = Forecast::from_columns(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn empty_forecast_reports_zero_horizon() {
        let fc = Forecast::new();
        assert!(fc.is_empty());
        assert_eq!(fc.horizon(), 0);
        assert_eq!(fc.dimensions(), 0);
        assert_eq!(fc.primary(), &[] as &[f64]);
    }

    #[test]
    fn out_of_bounds_dimension_access_errors() {
        let fc = Forecast::from_values(vec![1.0]);
        assert!(fc.series(0).is_ok());
        assert!(matches!(
            fc.series(1),
            Err(ForecastError::IndexOutOfBounds { index: 1, size: 1 })
        ));
    }
}
