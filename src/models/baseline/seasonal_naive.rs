//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Seasonal Naive forecaster.
///
/// Each forecast is equal to the observation from the same season in the
/// last full seasonal cycle.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    history: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalNaive {
    /// Create a new SeasonalNaive model with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            history: None,
            fitted: None,
            residuals: None,
        }
    }

    /// Get the seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.len() < self.period {
            return Err(ForecastError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        self.history = Some(values.to_vec());

        // Fitted values: y_hat[t] = y[t - period]
        let fitted: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    values[i - self.period]
                }
            })
            .collect();

        // Residuals: y[t] - y[t - period]
        let residuals: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    values[i] - values[i - self.period]
                }
            })
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let season_start = history.len() - self.period;
        let predictions: Vec<f64> = (0..horizon)
            .map(|k| history[season_start + k % self.period])
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use chrono::{TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let timestamps = (0..values.len())
            .map(|i| Utc.with_ymd_and_hms(2024, 1, 1, i as u32, 0, 0).unwrap())
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    #[test]
    fn seasonal_naive_repeats_last_cycle() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);

        let mut model = SeasonalNaive::new(3);
        model.fit(&ts).unwrap();

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.primary(), &[10.0, 20.0, 30.0, 10.0, 20.0]);
    }

    #[test]
    fn seasonal_naive_fitted_values_lag_one_period() {
        let ts = make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let mut model = SeasonalNaive::new(2);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[0].is_nan());
        assert!(fitted[1].is_nan());
        assert_eq!(&fitted[2..], &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn seasonal_naive_requires_one_full_period() {
        let ts = make_series(vec![1.0, 2.0]);

        let mut model = SeasonalNaive::new(3);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn seasonal_naive_requires_fit_before_predict() {
        let model = SeasonalNaive::new(4);
        assert!(matches!(model.predict(2), Err(ForecastError::FitRequired)));
    }
}
