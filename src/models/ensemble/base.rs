//! Shared state and helpers for ensemble models.

use crate::core::{Forecast, SeriesSet, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::ensemble::{BoxedMember, EnsembleMember};
use chrono::{DateTime, Utc};

/// Member ownership and fit bookkeeping shared by all ensembles.
///
/// Owns the member list, validates that members are homogeneous (all global
/// or all local), records the training series at fit time, and provides the
/// stacking helpers that align member forecasts into combined feature
/// series.
pub struct EnsembleBase {
    models: Vec<BoxedMember>,
    training: Option<SeriesSet>,
    is_global: bool,
}

impl EnsembleBase {
    /// Create the base over a non-empty, homogeneous member list.
    pub fn new(models: Vec<BoxedMember>) -> Result<Self> {
        if models.is_empty() {
            return Err(ForecastError::InvalidConfiguration(
                "ensemble requires at least one member model".to_string(),
            ));
        }

        let global_count = models.iter().filter(|m| m.is_global()).count();
        if global_count != 0 && global_count != models.len() {
            return Err(ForecastError::InvalidConfiguration(
                "cannot mix global and local member models in one ensemble".to_string(),
            ));
        }

        Ok(Self {
            is_global: global_count == models.len(),
            models,
            training: None,
        })
    }

    /// Shared fit bookkeeping; must run before any ensemble-specific logic.
    ///
    /// Rejects multi-series input for local ensembles and records the
    /// training series, which fixes the single/multi flag for the rest of
    /// the fit.
    pub fn record_fit(&mut self, series: &SeriesSet) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if !self.is_global && !series.is_single() {
            return Err(ForecastError::InvalidConfiguration(
                "an ensemble of local models accepts only a single training series".to_string(),
            ));
        }
        self.training = Some(series.clone());
        Ok(())
    }

    /// Whether every member is a global model.
    pub fn is_global_ensemble(&self) -> bool {
        self.is_global
    }

    /// Whether the recorded training run was on a single series.
    ///
    /// Meaningful only after `record_fit`.
    pub fn is_single_series(&self) -> bool {
        self.training.as_ref().map(SeriesSet::is_single).unwrap_or(false)
    }

    /// The training series recorded by `record_fit`.
    pub fn training_series(&self) -> Option<&SeriesSet> {
        self.training.as_ref()
    }

    /// Borrow the member models.
    pub fn models(&self) -> &[BoxedMember] {
        &self.models
    }

    /// Borrow the member models mutably.
    pub fn models_mut(&mut self) -> &mut [BoxedMember] {
        &mut self.models
    }

    /// Number of member models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Stack one forecast per member into a combined feature series.
    ///
    /// Every forecast must cover exactly `timestamps.len()` steps. The
    /// result has one column per member dimension, labelled by member name,
    /// aligned to the given timestamps.
    pub fn stack(
        &self,
        forecasts: &[Forecast],
        timestamps: &[DateTime<Utc>],
    ) -> Result<TimeSeries> {
        if forecasts.len() != self.models.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.models.len(),
                got: forecasts.len(),
            });
        }

        let mut columns = Vec::new();
        let mut labels = Vec::new();
        for (model, forecast) in self.models.iter().zip(forecasts.iter()) {
            if forecast.horizon() != timestamps.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: timestamps.len(),
                    got: forecast.horizon(),
                });
            }
            for (dim, column) in forecast.columns().enumerate() {
                columns.push(column.to_vec());
                if forecast.is_multivariate() {
                    labels.push(format!("{}_{}", model.name(), dim));
                } else {
                    labels.push(model.name().to_string());
                }
            }
        }

        let mut stacked = TimeSeries::multivariate(timestamps.to_vec(), columns)?;
        stacked.set_labels(labels)?;
        Ok(stacked)
    }

    /// Stack per-model, per-series forecasts into one feature series per
    /// target series, order preserved.
    ///
    /// `per_model[m][s]` is member `m`'s forecast for series `s`; the
    /// result's entry `s` is aligned to `targets.get(s)`'s timestamps.
    pub fn stack_multi(
        &self,
        per_model: &[Vec<Forecast>],
        targets: &SeriesSet,
    ) -> Result<Vec<TimeSeries>> {
        if per_model.len() != self.models.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.models.len(),
                got: per_model.len(),
            });
        }
        for forecasts in per_model {
            if forecasts.len() != targets.count() {
                return Err(ForecastError::DimensionMismatch {
                    expected: targets.count(),
                    got: forecasts.len(),
                });
            }
        }

        targets
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let slice: Vec<Forecast> = per_model
                    .iter()
                    .map(|forecasts| forecasts[index].clone())
                    .collect();
                self.stack(&slice, target.timestamps())
            })
            .collect()
    }
}
