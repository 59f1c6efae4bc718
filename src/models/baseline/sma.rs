//! Simple Moving Average forecasting model.
//!
//! Forecasts the mean of the last `window` observations for all future periods.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Simple Moving Average forecaster.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    last_mean: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SimpleMovingAverage {
    /// Create a new SMA model with the given window size.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            last_mean: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Get the window size.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for SimpleMovingAverage {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Forecaster for SimpleMovingAverage {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.len() < self.window {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: values.len(),
            });
        }

        let tail = &values[values.len() - self.window..];
        self.last_mean = Some(tail.iter().sum::<f64>() / self.window as f64);

        // Fitted values: y_hat[t] = mean of the window ending at t-1
        let fitted: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.window {
                    f64::NAN
                } else {
                    values[i - self.window..i].iter().sum::<f64>() / self.window as f64
                }
            })
            .collect();

        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let mean = self.last_mean.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        // SMA predicts the same value for all horizons
        Ok(Forecast::from_values(vec![mean; horizon]))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SimpleMovingAverage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let timestamps = (0..values.len())
            .map(|i| Utc.with_ymd_and_hms(2024, 1, 1, i as u32, 0, 0).unwrap())
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    #[test]
    fn sma_predicts_trailing_window_mean() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let mut model = SimpleMovingAverage::new(3);
        model.fit(&ts).unwrap();

        let forecast = model.predict(4).unwrap();
        for &value in forecast.primary() {
            assert_relative_eq!(value, 5.0, epsilon = 1e-10); // mean of [4, 5, 6]
        }
    }

    #[test]
    fn sma_fitted_values_use_preceding_window() {
        let ts = make_series(vec![2.0, 4.0, 6.0, 8.0]);

        let mut model = SimpleMovingAverage::new(2);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[0].is_nan());
        assert!(fitted[1].is_nan());
        assert_relative_eq!(fitted[2], 3.0, epsilon = 1e-10); // mean of [2, 4]
        assert_relative_eq!(fitted[3], 5.0, epsilon = 1e-10); // mean of [4, 6]
    }

    #[test]
    fn sma_requires_a_full_window() {
        let ts = make_series(vec![1.0, 2.0]);

        let mut model = SimpleMovingAverage::new(5);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 5, got: 2 })
        ));
    }

    #[test]
    fn sma_requires_fit_before_predict() {
        let model = SimpleMovingAverage::new(3);
        assert!(matches!(model.predict(2), Err(ForecastError::FitRequired)));
    }
}
