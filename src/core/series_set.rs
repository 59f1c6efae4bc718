//! Collection abstraction over one or many time series.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use std::slice;

/// One or many time series, handled through a single pipeline.
///
/// Forecasting entry points accept either a single series or a sequence of
/// series. `SeriesSet` carries that distinction as data, so splitting,
/// fitting, and output shaping are written once and the result keeps the
/// shape of the input: an operation on a `Single` yields a `Single`, one on
/// a `Multiple` yields a `Multiple` with order and pairing preserved.
#[derive(Debug, Clone)]
pub enum SeriesSet {
    Single(TimeSeries),
    Multiple(Vec<TimeSeries>),
}

impl From<TimeSeries> for SeriesSet {
    fn from(series: TimeSeries) -> Self {
        SeriesSet::Single(series)
    }
}

impl From<Vec<TimeSeries>> for SeriesSet {
    fn from(series: Vec<TimeSeries>) -> Self {
        SeriesSet::Multiple(series)
    }
}

impl SeriesSet {
    /// Whether this set holds exactly one series entered as a single series.
    pub fn is_single(&self) -> bool {
        matches!(self, SeriesSet::Single(_))
    }

    /// Number of series in the set.
    pub fn count(&self) -> usize {
        match self {
            SeriesSet::Single(_) => 1,
            SeriesSet::Multiple(series) => series.len(),
        }
    }

    /// Check if the set holds no series.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Iterate over the contained series in order.
    pub fn iter(&self) -> slice::Iter<'_, TimeSeries> {
        match self {
            SeriesSet::Single(series) => slice::from_ref(series).iter(),
            SeriesSet::Multiple(series) => series.iter(),
        }
    }

    /// Get a series by position.
    pub fn get(&self, index: usize) -> Option<&TimeSeries> {
        match self {
            SeriesSet::Single(series) => (index == 0).then_some(series),
            SeriesSet::Multiple(series) => series.get(index),
        }
    }

    /// Length of the shortest series in the set.
    pub fn shortest(&self) -> Option<usize> {
        self.iter().map(TimeSeries::len).min()
    }

    /// Borrow the series when the set is single.
    pub fn as_single(&self) -> Option<&TimeSeries> {
        match self {
            SeriesSet::Single(series) => Some(series),
            SeriesSet::Multiple(_) => None,
        }
    }

    /// Consume the set, returning the series when single.
    pub fn into_single(self) -> Option<TimeSeries> {
        match self {
            SeriesSet::Single(series) => Some(series),
            SeriesSet::Multiple(_) => None,
        }
    }

    /// Consume the set, returning all series in order.
    pub fn into_vec(self) -> Vec<TimeSeries> {
        match self {
            SeriesSet::Single(series) => vec![series],
            SeriesSet::Multiple(series) => series,
        }
    }

    /// Rebuild a set of the same shape from replacement series.
    ///
    /// The replacement count must match the set's series count.
    pub fn rebuilt_from(&self, mut series: Vec<TimeSeries>) -> Result<SeriesSet> {
        if series.len() != self.count() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.count(),
                got: series.len(),
            });
        }
        Ok(match self {
            SeriesSet::Single(_) => SeriesSet::Single(series.remove(0)),
            SeriesSet::Multiple(_) => SeriesSet::Multiple(series),
        })
    }

    /// Split off the last `n` points of every series.
    ///
    /// The split is applied independently, element-wise, preserving order
    /// and pairing: `prefixes.get(i)` and `suffixes.get(i)` come from the
    /// same input series.
    pub fn split_tail(&self, n: usize) -> Result<(SeriesSet, SeriesSet)> {
        let mut prefixes = Vec::with_capacity(self.count());
        let mut suffixes = Vec::with_capacity(self.count());
        for series in self.iter() {
            let (prefix, suffix) = series.split_tail(n)?;
            prefixes.push(prefix);
            suffixes.push(suffix);
        }
        Ok((self.rebuilt_from(prefixes)?, self.rebuilt_from(suffixes)?))
    }
}
