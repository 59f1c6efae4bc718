//! Regression-based forecasting.
//!
//! A point regressor (anything that can fit and predict over feature rows)
//! is adapted to a time-series contract by [`RegressionForecaster`], which
//! assembles feature rows from lag configurations. The regression ensemble
//! uses the same adapter, configured with a single zero-offset
//! future-covariate lag, to combine member forecasts.

mod lags;
mod linear;
mod model;

pub use lags::LagSpec;
pub use linear::LinearRegression;
pub use model::RegressionForecaster;

use crate::error::Result;

/// A point-regression model over feature rows.
///
/// `rows` holds one feature row per observation. Implementations carry
/// their own configuration and can produce an unfitted copy of themselves
/// for retrain-from-scratch workflows.
pub trait Regressor {
    /// Fit the regressor on feature rows and their targets.
    fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict one value per feature row.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// An unfitted copy with the same configuration.
    fn fresh(&self) -> Box<dyn Regressor>;

    /// Get the regressor name.
    fn name(&self) -> &str;
}
