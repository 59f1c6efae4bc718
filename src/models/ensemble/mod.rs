//! Ensemble forecasting.
//!
//! Combines multiple member models into a single forecast: either directly
//! ([`AveragingEnsemble`]) or through a regression model trained on held-out
//! data ([`RegressionEnsemble`]).

mod averaging;
mod base;
mod member;
mod regression;

pub use averaging::{AveragingEnsemble, Combination};
pub use base::EnsembleBase;
pub use member::{local, BoxedMember, EnsembleMember, LocalMember};
pub use regression::RegressionEnsemble;
