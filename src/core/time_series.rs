//! TimeSeries data structure for representing temporal data.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A time series with timestamps and values.
///
/// Values are stored in column-major format: one inner vector per dimension,
/// each with one entry per observation. Univariate series have a single
/// dimension.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    /// Values stored in column-major format: values[dimension][observation]
    values: Vec<Vec<f64>>,
    labels: Vec<String>,
    frequency: Option<Duration>,
}

impl TimeSeries {
    /// Create a multivariate time series from column-major values.
    pub fn multivariate(timestamps: Vec<DateTime<Utc>>, values: Vec<Vec<f64>>) -> Result<Self> {
        // Timestamps must be strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        for series in &values {
            if series.len() != timestamps.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: timestamps.len(),
                    got: series.len(),
                });
            }
        }

        Ok(Self {
            timestamps,
            values,
            labels: vec![],
            frequency: None,
        })
    }

    /// Create a simple univariate time series.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::multivariate(timestamps, vec![values])
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get the number of dimensions (1 for univariate).
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is multivariate.
    pub fn is_multivariate(&self) -> bool {
        self.values.len() > 1
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values for a specific dimension.
    pub fn values(&self, dimension: usize) -> Result<&[f64]> {
        self.values
            .get(dimension)
            .map(|v| v.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index: dimension,
                size: self.values.len(),
            })
    }

    /// Get primary (first dimension) values.
    pub fn primary_values(&self) -> &[f64] {
        self.values.first().map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get all values organized by dimension.
    pub fn values_by_dimension(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Get dimension labels (empty when unlabelled).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Set dimension labels.
    pub fn set_labels(&mut self, labels: Vec<String>) -> Result<()> {
        if !labels.is_empty() && labels.len() != self.dimensions() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.dimensions(),
                got: labels.len(),
            });
        }
        self.labels = labels;
        Ok(())
    }

    /// Get frequency.
    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    /// Set frequency.
    pub fn set_frequency(&mut self, freq: Duration) {
        self.frequency = Some(freq);
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        let timestamps = self.timestamps[start..end].to_vec();
        let values: Vec<Vec<f64>> = self
            .values
            .iter()
            .map(|dim| dim[start..end].to_vec())
            .collect();

        Ok(TimeSeries {
            timestamps,
            values,
            labels: self.labels.clone(),
            frequency: self.frequency,
        })
    }

    /// Split off the last `n` points.
    ///
    /// Returns (prefix, suffix) where the prefix is the series with its last
    /// `n` points removed and the suffix holds exactly those `n` points.
    /// Concatenating both reproduces the original series.
    pub fn split_tail(&self, n: usize) -> Result<(TimeSeries, TimeSeries)> {
        if n > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: n,
                got: self.len(),
            });
        }
        let cut = self.len() - n;
        Ok((self.slice(0, cut)?, self.slice(cut, self.len())?))
    }

    /// Infer frequency from timestamps.
    ///
    /// Picks the modal spacing between consecutive observations; fails when
    /// no spacing accounts for at least `tolerance` of all spacings.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Duration> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let diffs: Vec<i64> = self
            .timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds())
            .collect();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &diff in &diffs {
            *counts.entry(diff).or_insert(0) += 1;
        }

        let (modal_diff, modal_count) = counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&diff, &count)| (diff, count))
            .ok_or(ForecastError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total_count: usize = counts.values().sum();
        let modal_ratio = modal_count as f64 / total_count as f64;

        if modal_ratio < tolerance {
            return Err(ForecastError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Duration::seconds(modal_diff))
    }

    /// Extend the time axis past the last observation.
    ///
    /// Produces `n` timestamps spaced by the stored frequency, inferring the
    /// frequency from the data when none is set.
    pub fn future_timestamps(&self, n: usize) -> Result<Vec<DateTime<Utc>>> {
        let last = *self
            .timestamps
            .last()
            .ok_or(ForecastError::EmptyData)?;
        let freq = match self.frequency {
            Some(freq) => freq,
            None => self.infer_frequency(0.5)?,
        };
        Ok((1..=n as i64).map(|k| last + freq * k as i32).collect())
    }
}
