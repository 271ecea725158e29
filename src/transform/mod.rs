//! Resampling, coverage and concurrent-data preparation.
//!
//! Correlation models never see raw logger data. Both series are first
//! averaged onto a common window grid, and a window only counts when enough of
//! its expected samples were actually recorded:
//!
//! ```text
//! coverage = observed samples / (window length / native resolution)
//! ```
//!
//! Rows where reference and target both reach the coverage threshold form the
//! [`ConcurrentDataset`].
//!
//! The [`Preprocessor`] trait is the seam for this step; [`ResamplingPreprocessor`]
//! is the default implementation.

mod dataset;
mod preprocess;

pub use dataset::{ConcurrentDataset, ConcurrentRow, MultiConcurrentDataset};
pub use preprocess::{
    ConcurrentCoverageRow, ConcurrentInputs, PreprocessSettings, Preprocessor,
    ResamplingPreprocessor, align_without_resampling,
};

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::error::CorrelError;
use crate::series::{
    AggregationMethod, AveragingPeriod, TimeSeries, TimeSeriesPoint, Timestamp,
};

/// Aggregated values and coverage fractions on the same window grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampledSeries {
    /// Aggregated value per window (`NaN` for empty windows)
    pub values: TimeSeries,
    /// Fraction of expected samples present per window
    pub coverage: TimeSeries,
}

impl ResampledSeries {
    /// Values where coverage reaches `threshold`, `NaN` elsewhere.
    pub fn filtered(&self, threshold: f64) -> TimeSeries {
        let points = self
            .values
            .iter()
            .zip(self.coverage.iter())
            .map(|(v, c)| {
                let value = if c.value >= threshold { v.value } else { f64::NAN };
                TimeSeriesPoint::new(v.timestamp, value)
            })
            .collect();
        TimeSeries::from_sorted_points(points)
    }
}

/// Most common spacing between consecutive timestamps.
///
/// Ties resolve to the shorter spacing.
///
/// # Errors
/// Returns `InsufficientData` for fewer than two timestamps.
pub fn infer_resolution(timestamps: &[Timestamp]) -> Result<TimeDelta, CorrelError> {
    if timestamps.len() < 2 {
        return Err(CorrelError::insufficient(
            "at least two timestamps are needed to infer the data resolution",
        ));
    }

    let mut counts: BTreeMap<TimeDelta, usize> = BTreeMap::new();
    for pair in timestamps.windows(2) {
        let step = pair[1] - pair[0];
        if step > TimeDelta::zero() {
            *counts.entry(step).or_insert(0) += 1;
        }
    }

    let mut best: Option<(TimeDelta, usize)> = None;
    for (&step, &count) in &counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((step, count));
        }
    }

    best.map(|(step, _)| step)
        .ok_or_else(|| CorrelError::insufficient("timestamps have no positive spacing"))
}

/// Aggregate a series by `period`, reporting coverage per window.
///
/// Every window between the first and last timestamp is emitted, including
/// empty ones (coverage 0).
///
/// # Errors
/// - `InsufficientData` if the resolution cannot be inferred
/// - `InvalidConfig` if the period is shorter than the data resolution
pub fn resample_with_coverage(
    series: &TimeSeries,
    period: AveragingPeriod,
    method: &AggregationMethod,
) -> Result<ResampledSeries, CorrelError> {
    let resolution = infer_resolution(&series.timestamps())?;
    resample_with_resolution(series, period, method, resolution)
}

/// [`resample_with_coverage`] with a known native resolution.
pub(crate) fn resample_with_resolution(
    series: &TimeSeries,
    period: AveragingPeriod,
    method: &AggregationMethod,
    resolution: TimeDelta,
) -> Result<ResampledSeries, CorrelError> {
    if resolution <= TimeDelta::zero() {
        return Err(CorrelError::InvalidInput(format!(
            "data resolution must be positive, got {resolution}"
        )));
    }
    if max_window_length(period) < resolution {
        return Err(CorrelError::InvalidConfig(format!(
            "averaging period {period} is shorter than the data resolution {resolution}"
        )));
    }

    let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) else {
        return Ok(ResampledSeries {
            values: TimeSeries::default(),
            coverage: TimeSeries::default(),
        });
    };

    let resolution_secs = resolution.num_milliseconds() as f64 / 1000.0;
    let points = series.points();
    let mut cursor = 0;
    let mut window = Vec::new();
    let mut values = Vec::new();
    let mut coverage = Vec::new();

    let mut start = period.window_start(first)?;
    while start <= last {
        let end = period.next_window_start(start)?;

        window.clear();
        while cursor < points.len() && points[cursor].timestamp < end {
            if !points[cursor].is_missing() {
                window.push(points[cursor].value);
            }
            cursor += 1;
        }

        let window_secs = (end - start).num_milliseconds() as f64 / 1000.0;
        let expected = window_secs / resolution_secs;

        values.push(TimeSeriesPoint::new(start, method.apply(&window)));
        coverage.push(TimeSeriesPoint::new(start, window.len() as f64 / expected));
        start = end;
    }

    Ok(ResampledSeries {
        values: TimeSeries::from_sorted_points(values),
        coverage: TimeSeries::from_sorted_points(coverage),
    })
}

fn max_window_length(period: AveragingPeriod) -> TimeDelta {
    let n = i64::from(period.count());
    match period {
        AveragingPeriod::Months(_) => TimeDelta::days(31 * n),
        AveragingPeriod::Years(_) => TimeDelta::days(366 * n),
        _ => period.min_duration(),
    }
}
