//! Forecast-averaging ensemble.
//!
//! Combines member forecasts directly (mean, median, or fixed weights)
//! without a learned combiner. The regression ensemble is the learned
//! alternative.

use crate::core::{Forecast, SeriesSet};
use crate::error::{ForecastError, Result};
use crate::models::ensemble::{BoxedMember, EnsembleBase, EnsembleMember};

/// How member forecasts are combined.
#[derive(Debug, Clone, PartialEq)]
pub enum Combination {
    /// Simple average of all member forecasts.
    Mean,
    /// Per-step median of all member forecasts.
    Median,
    /// Fixed weights, one per member; normalized to sum to one.
    Weighted(Vec<f64>),
}

/// Ensemble that averages member forecasts.
pub struct AveragingEnsemble {
    base: EnsembleBase,
    combination: Combination,
    weights: Vec<f64>,
}

impl AveragingEnsemble {
    /// Create a mean-combining ensemble over the given members.
    pub fn new(models: Vec<BoxedMember>) -> Result<Self> {
        let base = EnsembleBase::new(models)?;
        let n = base.model_count();
        Ok(Self {
            base,
            combination: Combination::Mean,
            weights: vec![1.0 / n as f64; n],
        })
    }

    /// Set the combination method.
    pub fn with_combination(mut self, combination: Combination) -> Result<Self> {
        if let Combination::Weighted(ref weights) = combination {
            if weights.len() != self.base.model_count() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.base.model_count(),
                    got: weights.len(),
                });
            }
            let sum: f64 = weights.iter().sum();
            if sum <= 0.0 {
                return Err(ForecastError::InvalidConfiguration(
                    "combination weights must have a positive sum".to_string(),
                ));
            }
            self.weights = weights.iter().map(|w| w / sum).collect();
        }
        self.combination = combination;
        Ok(self)
    }

    /// The normalized member weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether every member is a global model.
    pub fn is_global_ensemble(&self) -> bool {
        self.base.is_global_ensemble()
    }

    /// Fit every member on the full training data.
    ///
    /// Covariates are routed per member: a member only receives the
    /// covariate types it declares it consumes.
    pub fn fit(
        &mut self,
        series: &SeriesSet,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<()> {
        self.base.record_fit(series)?;

        let is_global = self.base.is_global_ensemble();
        for model in self.base.models_mut() {
            if is_global {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.fit(series, past, future)?;
            } else {
                model.fit(series, None, None)?;
            }
        }
        Ok(())
    }

    /// Forecast `horizon` steps and combine the member forecasts.
    ///
    /// `series` optionally supplies explicit prediction contexts for global
    /// multi-series runs; it defaults to the recorded training series.
    /// Returns one combined forecast series per context, in context order.
    pub fn predict(
        &self,
        horizon: usize,
        series: Option<&SeriesSet>,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<SeriesSet> {
        let training = self.base.training_series().ok_or(ForecastError::FitRequired)?;
        let contexts = series.unwrap_or(training);

        // Global members predict with explicit contexts so covariates are
        // located on each context's future time axis; local members predict
        // from their own training context.
        let is_global = self.base.is_global_ensemble();
        let mut per_model = Vec::with_capacity(self.base.model_count());
        for model in self.base.models() {
            let forecasts = if is_global {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.predict(horizon, Some(contexts), past, future)?
            } else {
                model.predict(horizon, None, None, None)?
            };
            if forecasts.len() != contexts.count() {
                return Err(ForecastError::DimensionMismatch {
                    expected: contexts.count(),
                    got: forecasts.len(),
                });
            }
            per_model.push(forecasts);
        }

        let mut combined = Vec::with_capacity(contexts.count());
        for (index, context) in contexts.iter().enumerate() {
            let member_forecasts: Vec<&Forecast> =
                per_model.iter().map(|forecasts| &forecasts[index]).collect();
            let values = self.combine(&member_forecasts, horizon)?;
            let timestamps = context.future_timestamps(horizon)?;
            combined.push(crate::core::TimeSeries::univariate(timestamps, values)?);
        }

        contexts.rebuilt_from(combined)
    }

    /// Combine member forecasts step by step.
    fn combine(&self, forecasts: &[&Forecast], horizon: usize) -> Result<Vec<f64>> {
        for forecast in forecasts {
            if forecast.horizon() != horizon {
                return Err(ForecastError::DimensionMismatch {
                    expected: horizon,
                    got: forecast.horizon(),
                });
            }
        }

        let mut combined = vec![0.0; horizon];
        match &self.combination {
            Combination::Mean => {
                for (step, slot) in combined.iter_mut().enumerate() {
                    let sum: f64 = forecasts.iter().map(|f| f.primary()[step]).sum();
                    *slot = sum / forecasts.len() as f64;
                }
            }
            Combination::Median => {
                for (step, slot) in combined.iter_mut().enumerate() {
                    let mut values: Vec<f64> =
                        forecasts.iter().map(|f| f.primary()[step]).collect();
                    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                    let n = values.len();
                    *slot = if n % 2 == 0 {
                        (values[n / 2 - 1] + values[n / 2]) / 2.0
                    } else {
                        values[n / 2]
                    };
                }
            }
            Combination::Weighted(_) => {
                for (step, slot) in combined.iter_mut().enumerate() {
                    *slot = forecasts
                        .iter()
                        .zip(self.weights.iter())
                        .map(|(f, w)| f.primary()[step] * w)
                        .sum();
                }
            }
        }

        Ok(combined)
    }
}
