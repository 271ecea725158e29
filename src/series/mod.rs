//! Timestamped series primitives.
//!
//! This module provides:
//! - [`TimeSeries`]: strictly increasing `(timestamp, value)` points, with `NaN`
//!   marking a missing reading
//! - [`AveragingPeriod`]: fixed or calendar aggregation windows, parsed from
//!   frequency aliases such as `"10min"`, `"1H"` or `"1MS"`
//! - [`AggregationMethod`]: reducers applied inside each window
//! - [`align`]: inner join of several series on identical timestamps
//!
//! # Example
//!
//! ```ignore
//! use chrono::{NaiveDate, TimeDelta};
//! use correl_rs::series::{AveragingPeriod, TimeSeries};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let speeds = TimeSeries::regular(start, TimeDelta::minutes(10), &[5.1, 5.4, 6.0])?;
//! let period: AveragingPeriod = "1H".parse()?;
//! ```

mod aggregation;
mod period;

pub use aggregation::{AggregationMethod, mean, quantile, sample_std};
pub use period::AveragingPeriod;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::CorrelError;

/// Timestamp type used throughout the crate (naive, assumed UTC).
pub type Timestamp = NaiveDateTime;

/// A single time series data point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSeriesPoint {
    /// Observation time
    pub timestamp: Timestamp,
    /// Observed value, `NaN` when the reading is missing
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Create a new point.
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// True when the reading is missing.
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// Immutable time series with strictly increasing timestamps.
///
/// Gaps in the timestamp sequence are allowed; duplicated timestamps are not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    data: Vec<TimeSeriesPoint>,
    name: Option<String>,
}

impl TimeSeries {
    /// Create a time series from parallel arrays of timestamps and values.
    ///
    /// # Errors
    /// - `DimensionMismatch` if the arrays differ in length
    /// - `NonMonotonic` if timestamps are not strictly increasing
    pub fn new(timestamps: &[Timestamp], values: &[f64]) -> Result<Self, CorrelError> {
        if timestamps.len() != values.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} values", timestamps.len()),
                format!("{} values", values.len()),
            ));
        }

        let points = timestamps
            .iter()
            .zip(values.iter())
            .map(|(&timestamp, &value)| TimeSeriesPoint { timestamp, value })
            .collect();

        Self::from_points(points)
    }

    /// Create a time series from points, validating ordering.
    pub fn from_points(points: Vec<TimeSeriesPoint>) -> Result<Self, CorrelError> {
        for i in 1..points.len() {
            if points[i].timestamp <= points[i - 1].timestamp {
                return Err(CorrelError::NonMonotonic { index: i });
            }
        }

        Ok(Self {
            data: points,
            name: None,
        })
    }

    /// Create a regularly sampled series starting at `start`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `step` is not positive or the series is too
    /// long to index with `i32`.
    pub fn regular(start: Timestamp, step: TimeDelta, values: &[f64]) -> Result<Self, CorrelError> {
        if step <= TimeDelta::zero() {
            return Err(CorrelError::InvalidInput(format!(
                "sampling step must be positive, got {step}"
            )));
        }

        let data = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let index = i32::try_from(i).map_err(|_| {
                    CorrelError::InvalidInput(format!("series index {i} exceeds the i32 range"))
                })?;
                let offset = step.checked_mul(index).ok_or_else(|| {
                    CorrelError::InvalidInput(format!("offset {step} x {index} overflows"))
                })?;
                let timestamp = start.checked_add_signed(offset).ok_or_else(|| {
                    CorrelError::InvalidInput(format!("timestamp {start} + {offset} is out of range"))
                })?;
                Ok(TimeSeriesPoint { timestamp, value })
            })
            .collect::<Result<Vec<_>, CorrelError>>()?;

        Ok(Self { data, name: None })
    }

    /// Builds a series from points already known to be strictly increasing.
    pub(crate) fn from_sorted_points(data: Vec<TimeSeriesPoint>) -> Self {
        debug_assert!(data.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { data, name: None }
    }

    /// Attach a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Series name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of points (including missing readings).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Access the underlying points.
    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.data
    }

    /// Iterate over points.
    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesPoint> {
        self.data.iter()
    }

    /// Timestamps as a vector.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.data.iter().map(|p| p.timestamp).collect()
    }

    /// Values as a vector (missing readings kept as `NaN`).
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.value).collect()
    }

    /// Non-missing values.
    pub fn valid_values(&self) -> Vec<f64> {
        self.data
            .iter()
            .filter(|p| !p.is_missing())
            .map(|p| p.value)
            .collect()
    }

    /// First timestamp.
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.data.first().map(|p| p.timestamp)
    }

    /// Last timestamp.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.data.last().map(|p| p.timestamp)
    }

    /// Elapsed time between the first and last point.
    pub fn duration(&self) -> TimeDelta {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => TimeDelta::zero(),
        }
    }

    /// Value at an exact timestamp.
    pub fn get(&self, timestamp: Timestamp) -> Option<f64> {
        self.data
            .binary_search_by(|p| p.timestamp.cmp(&timestamp))
            .ok()
            .map(|i| self.data[i].value)
    }

    /// Copy without missing readings.
    pub fn dropna(&self) -> TimeSeries {
        Self {
            data: self
                .data
                .iter()
                .filter(|p| !p.is_missing())
                .copied()
                .collect(),
            name: self.name.clone(),
        }
    }

    /// Points with `from <= timestamp <= to`.
    pub fn between(&self, from: Timestamp, to: Timestamp) -> TimeSeries {
        let start = self.data.partition_point(|p| p.timestamp < from);
        let end = self.data.partition_point(|p| p.timestamp <= to);
        let data = if start < end {
            self.data[start..end].to_vec()
        } else {
            Vec::new()
        };
        Self {
            data,
            name: self.name.clone(),
        }
    }

    /// Apply `f` to every value, keeping timestamps.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> TimeSeries {
        Self {
            data: self
                .data
                .iter()
                .map(|p| TimeSeriesPoint {
                    timestamp: p.timestamp,
                    value: f(p.value),
                })
                .collect(),
            name: self.name.clone(),
        }
    }

    /// Mean of non-missing values (`NaN` when there are none).
    pub fn mean(&self) -> f64 {
        mean(&self.valid_values())
    }

    /// Sample standard deviation of non-missing values.
    pub fn std_dev(&self) -> f64 {
        sample_std(&self.valid_values())
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a TimeSeriesPoint;
    type IntoIter = std::slice::Iter<'a, TimeSeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Columns of several series joined on identical timestamps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignedColumns {
    /// Shared timestamps
    pub timestamps: Vec<Timestamp>,
    /// One column per input series, in input order
    pub columns: Vec<Vec<f64>>,
}

impl AlignedColumns {
    /// Number of aligned rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no rows survived the join.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Inner-join series on exact timestamps, dropping rows where any value is missing.
pub fn align(series: &[&TimeSeries]) -> AlignedColumns {
    let n_series = series.len();
    let mut aligned = AlignedColumns {
        timestamps: Vec::new(),
        columns: vec![Vec::new(); n_series],
    };
    let Some(first) = series.first() else {
        return aligned;
    };

    let mut cursors = vec![0usize; n_series];
    let mut row = Vec::with_capacity(n_series);

    'rows: for point in first.points() {
        if point.is_missing() {
            continue;
        }
        row.clear();
        row.push(point.value);

        for (k, other) in series.iter().enumerate().skip(1) {
            let pts = other.points();
            while cursors[k] < pts.len() && pts[cursors[k]].timestamp < point.timestamp {
                cursors[k] += 1;
            }
            if cursors[k] >= pts.len() {
                break 'rows;
            }
            let candidate = pts[cursors[k]];
            if candidate.timestamp != point.timestamp || candidate.is_missing() {
                continue 'rows;
            }
            row.push(candidate.value);
        }

        aligned.timestamps.push(point.timestamp);
        for (column, &value) in aligned.columns.iter_mut().zip(row.iter()) {
            column.push(value);
        }
    }

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TOL: f64 = 1e-10;

    fn t0() -> Timestamp {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_time_series_creation() {
        let ts = TimeSeries::regular(t0(), TimeDelta::minutes(10), &[1.0, 2.0, 1.5, 2.5]).unwrap();

        assert_eq!(ts.len(), 4);
        assert_eq!(ts.duration(), TimeDelta::minutes(30));
        assert!((ts.mean() - 1.75).abs() < TOL);
    }

    #[test]
    fn test_regular_rejects_out_of_range_timestamps() {
        // Third point lands about 274k years after the start
        let err = TimeSeries::regular(t0(), TimeDelta::days(50_000_000), &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CorrelError::InvalidInput(_)), "got {err:?}");

        let err = TimeSeries::regular(t0(), TimeDelta::zero(), &[1.0]).unwrap_err();
        assert!(matches!(err, CorrelError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_non_monotonic() {
        let times = vec![t0(), t0() + TimeDelta::hours(1), t0() + TimeDelta::hours(1)];
        let err = TimeSeries::new(&times, &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, CorrelError::NonMonotonic { index: 2 });
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let times = vec![t0(), t0() + TimeDelta::hours(1)];
        let err = TimeSeries::new(&times, &[1.0]).unwrap_err();
        assert!(matches!(err, CorrelError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_missing_values_ignored_by_statistics() {
        let ts = TimeSeries::regular(t0(), TimeDelta::hours(1), &[1.0, f64::NAN, 3.0]).unwrap();

        assert_eq!(ts.valid_values(), vec![1.0, 3.0]);
        assert!((ts.mean() - 2.0).abs() < TOL);
        assert_eq!(ts.dropna().len(), 2);
    }

    #[test]
    fn test_between_is_inclusive() {
        let ts = TimeSeries::regular(t0(), TimeDelta::hours(1), &[0.0, 1.0, 2.0, 3.0]).unwrap();
        let sub = ts.between(t0() + TimeDelta::hours(1), t0() + TimeDelta::hours(2));

        assert_eq!(sub.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_align_inner_join() {
        let a = TimeSeries::regular(t0(), TimeDelta::hours(1), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = TimeSeries::regular(t0() + TimeDelta::hours(1), TimeDelta::hours(1), &[20.0, f64::NAN, 40.0, 50.0])
            .unwrap();

        let aligned = align(&[&a, &b]);

        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.columns[0], vec![2.0, 4.0]);
        assert_eq!(aligned.columns[1], vec![20.0, 40.0]);
    }

    #[test]
    fn test_get_exact_timestamp() {
        let ts = TimeSeries::regular(t0(), TimeDelta::hours(1), &[5.0, 6.0]).unwrap();
        assert_eq!(ts.get(t0() + TimeDelta::hours(1)), Some(6.0));
        assert_eq!(ts.get(t0() + TimeDelta::minutes(30)), None);
    }
}
