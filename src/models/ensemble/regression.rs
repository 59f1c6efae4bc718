//! Regression ensemble: a learned combination of member forecasts.
//!
//! Training is two-phase. Phase 1 holds out the last `train_n_points` of
//! every training series, fits each member on the remaining prefix, and has
//! it predict exactly the held-out horizon; the stacked member predictions
//! become the features from which a regression model learns to reproduce
//! the held-out actuals. Phase 2 resets and refits every member on the full
//! series, so the ensemble leaves `fit` with production members and a
//! calibrated combiner. No training state from phase 1 survives.

use crate::core::{Forecast, SeriesSet, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::ensemble::{BoxedMember, EnsembleBase, EnsembleMember};
use crate::models::regression::{LagSpec, LinearRegression, RegressionForecaster, Regressor};

/// Ensemble that combines member forecasts through a regression model.
pub struct RegressionEnsemble {
    base: EnsembleBase,
    regression: RegressionForecaster,
    train_n_points: usize,
}

impl RegressionEnsemble {
    /// Create a regression ensemble with the default combiner: linear
    /// regression without intercept over the members' current-step
    /// forecasts.
    pub fn new(models: Vec<BoxedMember>, train_n_points: usize) -> Result<Self> {
        let regression = RegressionForecaster::new(
            Box::new(LinearRegression::without_intercept()),
            LagSpec::future_only(vec![0]),
        )?;
        Self::with_model(models, train_n_points, regression)
    }

    /// Create a regression ensemble around a raw point regressor, wrapping
    /// it with the zero-offset future-covariate lag configuration.
    pub fn with_regressor(
        models: Vec<BoxedMember>,
        train_n_points: usize,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self> {
        let regression = RegressionForecaster::new(regressor, LagSpec::future_only(vec![0]))?;
        Self::with_model(models, train_n_points, regression)
    }

    /// Create a regression ensemble around a pre-built regression
    /// forecaster.
    ///
    /// The forecaster must consume nothing but the single current-step
    /// future-covariate value: no target lags, no past-covariate lags, and
    /// future-covariate lags exactly `[0]`.
    pub fn with_model(
        models: Vec<BoxedMember>,
        train_n_points: usize,
        regression: RegressionForecaster,
    ) -> Result<Self> {
        if train_n_points == 0 {
            return Err(ForecastError::InvalidConfiguration(
                "train_n_points must be at least 1".to_string(),
            ));
        }

        let lags = regression.lags();
        if lags.target().is_some()
            || lags.past().is_some()
            || lags.future() != Some([0].as_slice())
        {
            return Err(ForecastError::InvalidConfiguration(
                "regression model must use no target lags, no past-covariate lags, and \
                 future-covariate lags exactly [0]"
                    .to_string(),
            ));
        }

        Ok(Self {
            base: EnsembleBase::new(models)?,
            regression,
            train_n_points,
        })
    }

    /// The calibration horizon.
    pub fn train_n_points(&self) -> usize {
        self.train_n_points
    }

    /// Whether every member is a global model.
    pub fn is_global_ensemble(&self) -> bool {
        self.base.is_global_ensemble()
    }

    /// Whether the recorded training run was on a single series.
    pub fn is_single_series(&self) -> bool {
        self.base.is_single_series()
    }

    /// Borrow the member models.
    pub fn models(&self) -> &[BoxedMember] {
        self.base.models()
    }

    /// Borrow the regression combiner.
    pub fn regression_model(&self) -> &RegressionForecaster {
        &self.regression
    }

    /// Train the ensemble on the given series.
    ///
    /// A failure at any step leaves the ensemble partially mutated; treat a
    /// failed `fit` as requiring a fresh instance.
    pub fn fit(
        &mut self,
        series: &SeriesSet,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<()> {
        self.base.record_fit(series)?;

        // The calibration horizon must leave at least one training point in
        // every series.
        let shortest = series.shortest().unwrap_or(0);
        if shortest <= self.train_n_points {
            return Err(ForecastError::InvalidConfiguration(format!(
                "train_n_points ({}) must be strictly smaller than the shortest training \
                 series ({} points)",
                self.train_n_points, shortest
            )));
        }

        // Single-series runs split the recorded training series; multi-series
        // runs split the incoming argument directly.
        let (forecast_training, regression_target) = match self.base.training_series() {
            Some(recorded) if recorded.is_single() => recorded.split_tail(self.train_n_points)?,
            _ => series.split_tail(self.train_n_points)?,
        };

        let is_global = self.base.is_global_ensemble();
        let is_single = self.base.is_single_series();

        // Phase 1: fit every member on the truncated prefix.
        for model in self.base.models_mut() {
            if is_global {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.fit(&forecast_training, past, future)?;
            } else {
                model.fit(&forecast_training, None, None)?;
            }
        }

        // Phase 1: predict exactly the held-out horizon.
        let mut per_model = Vec::with_capacity(self.base.model_count());
        for model in self.base.models() {
            let forecasts = if is_global && !is_single {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.predict(self.train_n_points, Some(&forecast_training), past, future)?
            } else {
                model.predict(self.train_n_points, None, None, None)?
            };
            if forecasts.len() != forecast_training.count() {
                return Err(ForecastError::DimensionMismatch {
                    expected: forecast_training.count(),
                    got: forecasts.len(),
                });
            }
            per_model.push(forecasts);
        }

        // Stack the member predictions into one feature series per target,
        // aligned to the held-out suffix.
        let stacked = self.base.stack_multi(&per_model, &regression_target)?;
        let stacked = regression_target.rebuilt_from(stacked)?;

        // Learn the combination: held-out actuals regressed on the stacked
        // member predictions.
        self.regression
            .fit_series(&regression_target, Some(&stacked))?;

        // Phase 2: reset members that must be rebuilt from scratch, then
        // refit everything on the full series.
        for model in self.base.models_mut() {
            if let Some(fresh) = model.untrained() {
                *model = fresh;
            }
        }

        let recorded = self.base.training_series().cloned();
        for model in self.base.models_mut() {
            if is_global {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.fit(series, past, future)?;
            } else {
                match &recorded {
                    Some(training) => model.fit(training, None, None)?,
                    None => model.fit(series, None, None)?,
                }
            }
        }

        Ok(())
    }

    /// Combine member predictions into the final blended forecast.
    ///
    /// `predictions` holds one stacked-feature series per original series
    /// (the single/multi shape mirrors the training input). The multi path
    /// requires `series`, the paired original series, to establish each
    /// prediction's context; results come back in pair order.
    pub fn ensemble(
        &self,
        predictions: &SeriesSet,
        series: Option<&SeriesSet>,
    ) -> Result<SeriesSet> {
        match predictions {
            SeriesSet::Single(prediction) => {
                let forecast = self
                    .regression
                    .predict_one(prediction.len(), None, Some(prediction))?;
                Ok(SeriesSet::Single(blended_series(prediction, &forecast)?))
            }
            SeriesSet::Multiple(predictions_vec) => {
                let contexts = series.ok_or_else(|| {
                    ForecastError::InvalidConfiguration(
                        "ensembling multiple series requires the paired original series"
                            .to_string(),
                    )
                })?;
                if contexts.count() != predictions_vec.len() {
                    return Err(ForecastError::DimensionMismatch {
                        expected: predictions_vec.len(),
                        got: contexts.count(),
                    });
                }

                let mut blended = Vec::with_capacity(predictions_vec.len());
                for (context, prediction) in contexts.iter().zip(predictions_vec.iter()) {
                    let forecast = self.regression.predict_one(
                        prediction.len(),
                        Some(context),
                        Some(prediction),
                    )?;
                    blended.push(blended_series(prediction, &forecast)?);
                }
                predictions.rebuilt_from(blended)
            }
        }
    }

    /// Forecast `horizon` steps: gather member forecasts, stack them on the
    /// future time axis, and blend them through the trained combiner.
    ///
    /// `series` optionally supplies explicit prediction contexts for global
    /// multi-series runs; it defaults to the recorded training series.
    pub fn predict(
        &self,
        horizon: usize,
        series: Option<&SeriesSet>,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<SeriesSet> {
        let training = self
            .base
            .training_series()
            .ok_or(ForecastError::FitRequired)?;
        let contexts = series.unwrap_or(training).clone();

        // Global members predict with explicit contexts so covariates are
        // located on each context's future time axis; local members predict
        // from their own training context.
        let is_global = self.base.is_global_ensemble();
        let mut per_model = Vec::with_capacity(self.base.model_count());
        for model in self.base.models() {
            let forecasts = if is_global {
                let past = past_covariates.filter(|_| model.uses_past_covariates());
                let future = future_covariates.filter(|_| model.uses_future_covariates());
                model.predict(horizon, Some(&contexts), past, future)?
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

        let mut stacked = Vec::with_capacity(contexts.count());
        for (index, context) in contexts.iter().enumerate() {
            let member_forecasts: Vec<Forecast> = per_model
                .iter()
                .map(|forecasts| forecasts[index].clone())
                .collect();
            let timestamps = context.future_timestamps(horizon)?;
            stacked.push(self.base.stack(&member_forecasts, &timestamps)?);
        }
        let stacked = contexts.rebuilt_from(stacked)?;

        self.ensemble(&stacked, Some(&contexts))
    }
}

/// Anchor a blended forecast to its prediction input's time axis.
fn blended_series(prediction: &TimeSeries, forecast: &Forecast) -> Result<TimeSeries> {
    TimeSeries::univariate(
        prediction.timestamps().to_vec(),
        forecast.primary().to_vec(),
    )
}
