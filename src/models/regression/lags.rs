//! Lag configuration for regression forecasters.

/// Which lagged inputs a regression forecaster consumes.
///
/// Offsets are relative to the step being predicted: `-1` is the previous
/// observation, `0` is the current step (only meaningful for future
/// covariates, which are known over the forecast horizon). A `None` group
/// means that input is not used at all.
///
/// `LagSpec` is plain data; whether a given combination is usable is decided
/// by the consumer (the regression forecaster rejects past-covariate lags,
/// the regression ensemble requires exactly zero-offset future lags).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LagSpec {
    target: Option<Vec<i64>>,
    past: Option<Vec<i64>>,
    future: Option<Vec<i64>>,
}

impl LagSpec {
    /// No lagged inputs at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only future-covariate lags at the given offsets.
    pub fn future_only(offsets: Vec<i64>) -> Self {
        Self {
            target: None,
            past: None,
            future: Some(offsets),
        }
    }

    /// Set target lags (offsets into the series being forecast).
    pub fn with_target(mut self, offsets: Vec<i64>) -> Self {
        self.target = Some(offsets);
        self
    }

    /// Set past-covariate lags.
    pub fn with_past(mut self, offsets: Vec<i64>) -> Self {
        self.past = Some(offsets);
        self
    }

    /// Set future-covariate lags.
    pub fn with_future(mut self, offsets: Vec<i64>) -> Self {
        self.future = Some(offsets);
        self
    }

    /// Target lag offsets, if any.
    pub fn target(&self) -> Option<&[i64]> {
        self.target.as_deref()
    }

    /// Past-covariate lag offsets, if any.
    pub fn past(&self) -> Option<&[i64]> {
        self.past.as_deref()
    }

    /// Future-covariate lag offsets, if any.
    pub fn future(&self) -> Option<&[i64]> {
        self.future.as_deref()
    }

    /// Whether no lag group is configured at all.
    pub fn is_empty(&self) -> bool {
        self.target.is_none() && self.past.is_none() && self.future.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_only_sets_exactly_one_group() {
        let lags = LagSpec::future_only(vec![0]);
        assert!(lags.target().is_none());
        assert!(lags.past().is_none());
        assert_eq!(lags.future(), Some([0].as_slice()));
    }

    #[test]
    fn builder_accumulates_groups() {
        let lags = LagSpec::none()
            .with_target(vec![-1, -2])
            .with_future(vec![0]);
        assert_eq!(lags.target(), Some([-1, -2].as_slice()));
        assert!(lags.past().is_none());
        assert_eq!(lags.future(), Some([0].as_slice()));
        assert!(!lags.is_empty());
    }

    #[test]
    fn none_is_empty() {
        assert!(LagSpec::none().is_empty());
    }
}
