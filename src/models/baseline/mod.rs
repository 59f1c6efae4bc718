//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks and as lightweight ensemble members.

mod naive;
mod seasonal_naive;
mod sma;

pub use naive::Naive;
pub use seasonal_naive::SeasonalNaive;
pub use sma::SimpleMovingAverage;
