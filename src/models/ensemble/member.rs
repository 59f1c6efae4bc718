//! Ensemble member contract and the local-model adapter.

use crate::core::{Forecast, SeriesSet};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// A forecasting model usable as an ensemble member.
///
/// Every capability the ensemble needs to know about is an explicit query:
/// whether the model is global (one trained instance predicts across
/// series), which covariate types it consumes, and whether it must be
/// rebuilt from scratch between trainings (`untrained`). The ensemble
/// routes covariates and resets strictly by these answers.
pub trait EnsembleMember {
    /// Get the model name.
    fn name(&self) -> &str;

    /// Whether one trained instance predicts across multiple series.
    fn is_global(&self) -> bool {
        false
    }

    /// Whether fit/predict consume past covariates.
    fn uses_past_covariates(&self) -> bool {
        false
    }

    /// Whether fit/predict consume future covariates.
    fn uses_future_covariates(&self) -> bool {
        false
    }

    /// Fit the model on the given series.
    ///
    /// Covariates are only passed when the corresponding capability query
    /// answers true; local models receive the bare series.
    fn fit(
        &mut self,
        series: &SeriesSet,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<()>;

    /// Forecast `horizon` steps, one forecast per context series.
    ///
    /// With `series == None` the model predicts from its own retained
    /// training context and returns exactly one forecast.
    fn predict(
        &self,
        horizon: usize,
        series: Option<&SeriesSet>,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<Vec<Forecast>>;

    /// An unfitted copy, for models whose training state cannot be
    /// incrementally extended and must be rebuilt from scratch.
    ///
    /// `None` means the model can simply be refit in place.
    fn untrained(&self) -> Option<BoxedMember> {
        None
    }
}

/// Type alias for boxed ensemble members.
pub type BoxedMember = Box<dyn EnsembleMember>;

/// Adapter exposing a local [`Forecaster`] as an ensemble member.
///
/// A pristine copy of the wrapped model is kept from construction time;
/// `untrained` hands out clones of it, so a reset always starts from the
/// exact pre-training configuration.
pub struct LocalMember<F: Forecaster + Clone> {
    template: F,
    model: F,
}

impl<F: Forecaster + Clone> LocalMember<F> {
    pub fn new(model: F) -> Self {
        Self {
            template: model.clone(),
            model,
        }
    }
}

/// Box a local forecaster as an ensemble member.
pub fn local<F: Forecaster + Clone + 'static>(model: F) -> BoxedMember {
    Box::new(LocalMember::new(model))
}

impl<F: Forecaster + Clone + 'static> EnsembleMember for LocalMember<F> {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn fit(
        &mut self,
        series: &SeriesSet,
        _past_covariates: Option<&SeriesSet>,
        _future_covariates: Option<&SeriesSet>,
    ) -> Result<()> {
        let single = series.as_single().ok_or_else(|| {
            ForecastError::InvalidConfiguration(format!(
                "local model {} requires a single training series",
                self.model.name()
            ))
        })?;
        self.model.fit(single)
    }

    fn predict(
        &self,
        horizon: usize,
        series: Option<&SeriesSet>,
        _past_covariates: Option<&SeriesSet>,
        _future_covariates: Option<&SeriesSet>,
    ) -> Result<Vec<Forecast>> {
        if series.is_some() {
            return Err(ForecastError::InvalidConfiguration(format!(
                "local model {} predicts only from its own training context",
                self.model.name()
            )));
        }
        Ok(vec![self.model.predict(horizon)?])
    }

    fn untrained(&self) -> Option<BoxedMember> {
        Some(Box::new(LocalMember::new(self.template.clone())))
    }
}
