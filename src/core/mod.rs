//! Core data structures for time series forecasting.

mod forecast;
mod series_set;
mod time_series;

pub use forecast::Forecast;
pub use series_set::SeriesSet;
pub use time_series::TimeSeries;
