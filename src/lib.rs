//! # stackcast
//!
//! Stacking-ensemble time series forecasting.
//!
//! Member forecasting models are trained on a truncated series, their
//! forecasts over the held-out tail are stacked into a feature series, and
//! a regression model learns how to combine them; the members are then
//! refit on the full data so the ensemble is ready for genuine forward
//! forecasting. A forecast-averaging ensemble, baseline models, and a
//! lag-configured regression forecaster round out the toolkit.

pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, SeriesSet, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::ensemble::{local, EnsembleMember, RegressionEnsemble};
    pub use crate::models::Forecaster;
}
