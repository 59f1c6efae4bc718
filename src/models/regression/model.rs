//! Regression forecaster: a point regressor behind a time-series contract.
//!
//! Assembles feature rows from lagged target values and future-covariate
//! values, fits the wrapped regressor on them, and forecasts by recursive
//! multi-step prediction. Fitting pools rows across all training series, so
//! the model is global: one trained instance predicts for any series given
//! as context. Future covariates are matched to the target by timestamp, so
//! one covariate series can cover several training windows.

use crate::core::{Forecast, SeriesSet, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::ensemble::{BoxedMember, EnsembleMember};
use crate::models::regression::{LagSpec, LinearRegression, Regressor};
use chrono::{DateTime, Utc};

/// Time-series regression model over lagged features.
pub struct RegressionForecaster {
    lags: LagSpec,
    regressor: Box<dyn Regressor>,
    /// Primary values of each training series, in input order.
    histories: Option<Vec<Vec<f64>>>,
}

impl RegressionForecaster {
    /// Wrap a point regressor with the given lag configuration.
    pub fn new(regressor: Box<dyn Regressor>, lags: LagSpec) -> Result<Self> {
        if lags.is_empty() {
            return Err(ForecastError::InvalidConfiguration(
                "at least one lag group must be configured".to_string(),
            ));
        }
        if let Some(target) = lags.target() {
            if target.is_empty() {
                return Err(ForecastError::InvalidConfiguration(
                    "target lags must not be empty".to_string(),
                ));
            }
            if target.iter().any(|&l| l >= 0) {
                return Err(ForecastError::InvalidConfiguration(
                    "target lags must be negative offsets".to_string(),
                ));
            }
        }
        if lags.past().is_some() {
            return Err(ForecastError::InvalidConfiguration(
                "past-covariate lags are not supported by RegressionForecaster".to_string(),
            ));
        }
        if let Some(future) = lags.future() {
            if future.is_empty() {
                return Err(ForecastError::InvalidConfiguration(
                    "future-covariate lags must not be empty".to_string(),
                ));
            }
        }
        Ok(Self {
            lags,
            regressor,
            histories: None,
        })
    }

    /// Linear regression over the given lag configuration.
    pub fn linear(lags: LagSpec) -> Result<Self> {
        Self::new(Box::new(LinearRegression::new()), lags)
    }

    /// The lag configuration.
    pub fn lags(&self) -> &LagSpec {
        &self.lags
    }

    /// Name of the wrapped regressor.
    pub fn regressor_name(&self) -> &str {
        self.regressor.name()
    }

    /// Check if the model has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.histories.is_some()
    }

    /// Fit on one or many series, pooling feature rows across them.
    ///
    /// When future-covariate lags are configured, `future_covariates` must
    /// hold one covariate series per target series, paired by position and
    /// covering each target's time span.
    pub fn fit_series(
        &mut self,
        series: &SeriesSet,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        if self.lags.future().is_some() {
            let fut = future_covariates.ok_or_else(|| missing_covariates_error())?;
            if fut.count() != series.count() {
                return Err(ForecastError::DimensionMismatch {
                    expected: series.count(),
                    got: fut.count(),
                });
            }
        }

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for (index, ts) in series.iter().enumerate() {
            let fut = future_covariates.and_then(|f| f.get(index));
            self.accumulate_rows(ts, fut, &mut rows, &mut targets)?;
        }

        self.regressor.fit(&rows, &targets)?;
        self.histories = Some(series.iter().map(|s| s.primary_values().to_vec()).collect());
        Ok(())
    }

    /// Forecast `horizon` steps for a single series context.
    ///
    /// `context` supplies the history the target lags read from; when the
    /// model was fitted on exactly one series it defaults to that series.
    /// With a context, future covariates are located by timestamp on the
    /// context's extended time axis; without one they are read positionally
    /// from the start and must cover the horizon.
    pub fn predict_one(
        &self,
        horizon: usize,
        context: Option<&TimeSeries>,
        future_covariates: Option<&TimeSeries>,
    ) -> Result<Forecast> {
        let histories = self.histories.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let history: Option<&[f64]> = match (self.lags.target(), context) {
            (None, _) => None,
            (Some(_), Some(ts)) => Some(ts.primary_values()),
            (Some(_), None) => {
                if histories.len() == 1 {
                    Some(histories[0].as_slice())
                } else {
                    return Err(ForecastError::InvalidConfiguration(
                        "fitted on multiple series; an explicit series context is required"
                            .to_string(),
                    ));
                }
            }
        };

        let future_window: Option<(&[i64], Vec<Vec<f64>>)> =
            match (self.lags.future(), future_covariates) {
                (Some(offsets), Some(fut)) => {
                    if offsets.iter().any(|&offset| offset < 0) {
                        return Err(ForecastError::InvalidConfiguration(
                            "negative future-covariate lags would read before the forecast \
                             start"
                                .to_string(),
                        ));
                    }
                    let ahead = offsets.iter().copied().max().unwrap_or(0) as usize;
                    let needed = horizon + ahead;
                    let window = match context {
                        Some(ts) => covariate_window(fut, &ts.future_timestamps(needed)?)?,
                        None => {
                            if fut.len() < needed {
                                return Err(ForecastError::InsufficientData {
                                    needed,
                                    got: fut.len(),
                                });
                            }
                            fut.values_by_dimension()
                                .iter()
                                .map(|col| col[..needed].to_vec())
                                .collect()
                        }
                    };
                    Some((offsets, window))
                }
                (Some(_), None) => return Err(missing_covariates_error()),
                (None, _) => None,
            };

        let mut extended: Vec<f64> = history.map(<[f64]>::to_vec).unwrap_or_default();
        let base_len = extended.len();
        if let Some(target_lags) = self.lags.target() {
            let back = target_lags.iter().map(|&l| -l as usize).max().unwrap_or(0);
            if base_len < back {
                return Err(ForecastError::InsufficientData {
                    needed: back,
                    got: base_len,
                });
            }
        }

        let mut predictions = Vec::with_capacity(horizon);
        for step in 0..horizon {
            let mut row = Vec::new();
            if let Some(target_lags) = self.lags.target() {
                for &lag in target_lags {
                    let index = (base_len + step) as i64 + lag;
                    row.push(extended[index as usize]);
                }
            }
            if let Some((offsets, window)) = &future_window {
                for &offset in offsets.iter() {
                    let index = step + offset as usize;
                    for column in window {
                        row.push(column[index]);
                    }
                }
            }

            let predicted = self.regressor.predict(std::slice::from_ref(&row))?;
            let value = predicted.first().copied().ok_or_else(|| {
                ForecastError::ComputationError("regressor returned no prediction".to_string())
            })?;
            extended.push(value);
            predictions.push(value);
        }

        Ok(Forecast::from_values(predictions))
    }

    /// Build feature rows and targets for one training series.
    fn accumulate_rows(
        &self,
        series: &TimeSeries,
        future_covariates: Option<&TimeSeries>,
        rows: &mut Vec<Vec<f64>>,
        targets: &mut Vec<f64>,
    ) -> Result<()> {
        let y = series.primary_values();

        let window: Option<Vec<Vec<f64>>> = match self.lags.future() {
            Some(_) => {
                let fut = future_covariates.ok_or_else(|| missing_covariates_error())?;
                Some(covariate_window(fut, series.timestamps())?)
            }
            None => None,
        };

        let mut back = 0usize;
        let mut ahead = 0usize;
        if let Some(target_lags) = self.lags.target() {
            back = target_lags.iter().map(|&l| -l as usize).max().unwrap_or(0);
        }
        if let Some(offsets) = self.lags.future() {
            for &offset in offsets {
                if offset < 0 {
                    back = back.max(-offset as usize);
                } else {
                    ahead = ahead.max(offset as usize);
                }
            }
        }

        if y.len() < back + ahead + 1 {
            return Err(ForecastError::InsufficientData {
                needed: back + ahead + 1,
                got: y.len(),
            });
        }

        for t in back..(y.len() - ahead) {
            let mut row = Vec::new();
            if let Some(target_lags) = self.lags.target() {
                for &lag in target_lags {
                    row.push(y[(t as i64 + lag) as usize]);
                }
            }
            if let (Some(offsets), Some(window)) = (self.lags.future(), window.as_ref()) {
                for &offset in offsets {
                    let index = (t as i64 + offset) as usize;
                    for column in window {
                        row.push(column[index]);
                    }
                }
            }
            rows.push(row);
            targets.push(y[t]);
        }

        Ok(())
    }
}

fn missing_covariates_error() -> ForecastError {
    ForecastError::InvalidConfiguration(
        "future-covariate lags configured but no future covariates supplied".to_string(),
    )
}

/// Extract the covariate values covering exactly the given timestamps.
///
/// The covariate series must contain the requested timestamps as a
/// contiguous run; the window is returned column by column.
fn covariate_window(
    covariates: &TimeSeries,
    timestamps: &[DateTime<Utc>],
) -> Result<Vec<Vec<f64>>> {
    let first = match timestamps.first() {
        Some(first) => first,
        None => return Ok(vec![Vec::new(); covariates.dimensions()]),
    };

    let start = covariates
        .timestamps()
        .iter()
        .position(|t| t == first)
        .ok_or_else(|| {
            ForecastError::TimestampError(
                "future covariates do not cover the requested time span".to_string(),
            )
        })?;

    if start + timestamps.len() > covariates.len() {
        return Err(ForecastError::InsufficientData {
            needed: start + timestamps.len(),
            got: covariates.len(),
        });
    }
    for (offset, expected) in timestamps.iter().enumerate() {
        if covariates.timestamps()[start + offset] != *expected {
            return Err(ForecastError::TimestampError(
                "future covariate timestamps do not align with the target series".to_string(),
            ));
        }
    }

    Ok(covariates
        .values_by_dimension()
        .iter()
        .map(|column| column[start..start + timestamps.len()].to_vec())
        .collect())
}

impl EnsembleMember for RegressionForecaster {
    fn name(&self) -> &str {
        "RegressionForecaster"
    }

    fn is_global(&self) -> bool {
        true
    }

    fn uses_future_covariates(&self) -> bool {
        self.lags.future().is_some()
    }

    fn fit(
        &mut self,
        series: &SeriesSet,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<()> {
        if past_covariates.is_some() {
            return Err(ForecastError::InvalidConfiguration(
                "past covariates are not supported by RegressionForecaster".to_string(),
            ));
        }
        self.fit_series(series, future_covariates)
    }

    fn predict(
        &self,
        horizon: usize,
        series: Option<&SeriesSet>,
        past_covariates: Option<&SeriesSet>,
        future_covariates: Option<&SeriesSet>,
    ) -> Result<Vec<Forecast>> {
        if past_covariates.is_some() {
            return Err(ForecastError::InvalidConfiguration(
                "past covariates are not supported by RegressionForecaster".to_string(),
            ));
        }

        match series {
            Some(contexts) => {
                if let Some(fut) = future_covariates {
                    if fut.count() != contexts.count() {
                        return Err(ForecastError::DimensionMismatch {
                            expected: contexts.count(),
                            got: fut.count(),
                        });
                    }
                }
                contexts
                    .iter()
                    .enumerate()
                    .map(|(index, context)| {
                        let fut = future_covariates.and_then(|f| f.get(index));
                        self.predict_one(horizon, Some(context), fut)
                    })
                    .collect()
            }
            None => {
                if let Some(fut) = future_covariates {
                    if fut.count() != 1 {
                        return Err(ForecastError::DimensionMismatch {
                            expected: 1,
                            got: fut.count(),
                        });
                    }
                }
                let fut = future_covariates.and_then(|f| f.get(0));
                Ok(vec![self.predict_one(horizon, None, fut)?])
            }
        }
    }

    fn untrained(&self) -> Option<BoxedMember> {
        Some(Box::new(Self {
            lags: self.lags.clone(),
            regressor: self.regressor.fresh(),
            histories: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let timestamps = (0..values.len())
            .map(|i| {
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64)
            })
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn make_multivariate(columns: Vec<Vec<f64>>) -> TimeSeries {
        let n = columns.first().map(Vec::len).unwrap_or(0);
        let timestamps = (0..n)
            .map(|i| {
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64)
            })
            .collect();
        TimeSeries::multivariate(timestamps, columns).unwrap()
    }

    #[test]
    fn construction_rejects_unsupported_lag_groups() {
        let empty = RegressionForecaster::linear(LagSpec::none());
        assert!(matches!(empty, Err(ForecastError::InvalidConfiguration(_))));

        let nonnegative_target =
            RegressionForecaster::linear(LagSpec::none().with_target(vec![0]));
        assert!(matches!(
            nonnegative_target,
            Err(ForecastError::InvalidConfiguration(_))
        ));

        let past = RegressionForecaster::linear(LagSpec::none().with_past(vec![-1]));
        assert!(matches!(past, Err(ForecastError::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_offset_future_lags_learn_a_linear_combination() {
        // target = 0.3 * f1 + 0.7 * f2
        let f1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let f2 = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let target: Vec<f64> = f1
            .iter()
            .zip(f2.iter())
            .map(|(a, b)| 0.3 * a + 0.7 * b)
            .collect();

        let mut model = RegressionForecaster::new(
            Box::new(LinearRegression::without_intercept()),
            LagSpec::future_only(vec![0]),
        )
        .unwrap();

        let series: SeriesSet = make_series(target).into();
        let covariates: SeriesSet = make_multivariate(vec![f1, f2]).into();
        model.fit_series(&series, Some(&covariates)).unwrap();

        let new_features = make_multivariate(vec![vec![10.0, 20.0], vec![30.0, 10.0]]);
        let forecast = model.predict_one(2, None, Some(&new_features)).unwrap();

        assert_eq!(forecast.horizon(), 2);
        assert_relative_eq!(
            forecast.primary()[0],
            0.3 * 10.0 + 0.7 * 30.0,
            epsilon = 1e-5
        );
        assert_relative_eq!(
            forecast.primary()[1],
            0.3 * 20.0 + 0.7 * 10.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn target_lags_forecast_recursively() {
        // y[t] = 0.8 * y[t-1], exactly
        let mut values = vec![100.0];
        for _ in 1..30 {
            values.push(values.last().copied().unwrap_or(0.0) * 0.8);
        }
        let last = *values.last().unwrap();

        let mut model = RegressionForecaster::new(
            Box::new(LinearRegression::without_intercept()),
            LagSpec::none().with_target(vec![-1]),
        )
        .unwrap();

        let series: SeriesSet = make_series(values).into();
        model.fit_series(&series, None).unwrap();

        let forecast = model.predict_one(3, None, None).unwrap();
        assert_relative_eq!(forecast.primary()[0], last * 0.8, epsilon = 1e-4);
        assert_relative_eq!(forecast.primary()[1], last * 0.8 * 0.8, epsilon = 1e-4);
        assert_relative_eq!(forecast.primary()[2], last * 0.8 * 0.8 * 0.8, epsilon = 1e-4);
    }

    #[test]
    fn global_fit_pools_rows_across_series() {
        // Both series follow y[t] = 0.5 * y[t-1]
        let series_a: Vec<f64> = (0..20)
            .scan(64.0, |s, _| {
                let v = *s;
                *s *= 0.5;
                Some(v)
            })
            .collect();
        let series_b: Vec<f64> = (0..20)
            .scan(1024.0, |s, _| {
                let v = *s;
                *s *= 0.5;
                Some(v)
            })
            .collect();

        let mut model = RegressionForecaster::new(
            Box::new(LinearRegression::without_intercept()),
            LagSpec::none().with_target(vec![-1]),
        )
        .unwrap();

        let set: SeriesSet = vec![make_series(series_a), make_series(series_b.clone())].into();
        model.fit_series(&set, None).unwrap();

        // Predicting without explicit context is ambiguous after a
        // multi-series fit
        assert!(matches!(
            model.predict_one(1, None, None),
            Err(ForecastError::InvalidConfiguration(_))
        ));

        let context = make_series(series_b.clone());
        let forecast = model.predict_one(2, Some(&context), None).unwrap();
        let last = *series_b.last().unwrap();
        assert_relative_eq!(forecast.primary()[0], last * 0.5, epsilon = 1e-6);
        assert_relative_eq!(forecast.primary()[1], last * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn covariates_are_located_by_timestamp() {
        // Covariate series extends past the target; the fit window and the
        // prediction window are both carved out by timestamp.
        let target = make_series(vec![2.0, 4.0, 6.0, 8.0]);
        let covariate_values: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let covariates = make_series(covariate_values); // two points past the target

        let mut model = RegressionForecaster::new(
            Box::new(LinearRegression::without_intercept()),
            LagSpec::future_only(vec![0]),
        )
        .unwrap();

        let series: SeriesSet = target.clone().into();
        let covariate_set: SeriesSet = covariates.clone().into();
        model.fit_series(&series, Some(&covariate_set)).unwrap();

        // With the target as context, prediction reads covariates at the two
        // timestamps following the target's end: values 5.0 and 6.0.
        let forecast = model.predict_one(2, Some(&target), Some(&covariates)).unwrap();
        assert_relative_eq!(forecast.primary()[0], 10.0, epsilon = 1e-5);
        assert_relative_eq!(forecast.primary()[1], 12.0, epsilon = 1e-5);
    }

    #[test]
    fn predict_requires_fit_and_covariate_coverage() {
        let model = RegressionForecaster::linear(LagSpec::future_only(vec![0])).unwrap();
        assert!(matches!(
            model.predict_one(3, None, None),
            Err(ForecastError::FitRequired)
        ));

        let mut model = RegressionForecaster::linear(LagSpec::future_only(vec![0])).unwrap();
        let series: SeriesSet = make_series(vec![1.0, 2.0, 3.0, 4.0]).into();
        let covariates: SeriesSet = make_series(vec![1.0, 2.0, 3.0, 4.0]).into();
        model.fit_series(&series, Some(&covariates)).unwrap();

        // Horizon 3 needs 3 covariate points
        let short = make_series(vec![1.0, 2.0]);
        assert!(matches!(
            model.predict_one(3, None, Some(&short)),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));

        // Missing covariates entirely
        assert!(matches!(
            model.predict_one(3, None, None),
            Err(ForecastError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn fit_checks_covariate_coverage() {
        let mut model = RegressionForecaster::linear(LagSpec::future_only(vec![0])).unwrap();
        let series: SeriesSet = make_series(vec![1.0, 2.0, 3.0, 4.0]).into();
        let short: SeriesSet = make_series(vec![1.0, 2.0]).into();

        assert!(matches!(
            model.fit_series(&series, Some(&short)),
            Err(ForecastError::InsufficientData { needed: 4, got: 2 })
        ));
    }

    #[test]
    fn untrained_copy_keeps_configuration_and_drops_state() {
        let mut model = RegressionForecaster::linear(LagSpec::future_only(vec![0])).unwrap();
        let series: SeriesSet = make_series(vec![1.0, 2.0, 3.0]).into();
        let covariates: SeriesSet = make_series(vec![2.0, 4.0, 6.0]).into();
        model.fit_series(&series, Some(&covariates)).unwrap();
        assert!(model.is_fitted());

        let copy = EnsembleMember::untrained(&model).unwrap();
        assert!(copy.is_global());
        assert!(copy.uses_future_covariates());
        assert!(matches!(
            copy.predict(1, None, None, Some(&covariates)),
            Err(ForecastError::FitRequired)
        ));
    }
}
