//! Utility functions for forecasting models.

pub mod ols;

pub use ols::{ols_fit, OlsFit};
