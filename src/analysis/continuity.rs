//! Data continuity and coverage reports.

use chrono::TimeDelta;

use crate::error::CorrelError;
use crate::series::{AggregationMethod, AveragingPeriod, TimeSeries, Timestamp};
use crate::transform::{
    ConcurrentCoverageRow, PreprocessSettings, Preprocessor, ResamplingPreprocessor,
    infer_resolution, resample_with_coverage,
};

/// A break in the expected sampling interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContinuityGap {
    /// Last timestamp before the gap
    pub date_from: Timestamp,
    /// First timestamp after the gap
    pub date_to: Timestamp,
    /// Elapsed time between the two, in days
    pub days_lost: f64,
}

impl ContinuityGap {
    /// Elapsed time between the bounding timestamps.
    pub fn duration(&self) -> TimeDelta {
        self.date_to - self.date_from
    }
}

/// Consecutive valid readings whose spacing differs from the native resolution.
///
/// Missing (`NaN`) readings are dropped first, so a run of missing values
/// shows up as a gap. Spacings shorter than the resolution are reported too.
///
/// # Errors
/// Returns `InsufficientData` when the resolution cannot be inferred.
pub fn get_time_continuity_gaps(series: &TimeSeries) -> Result<Vec<ContinuityGap>, CorrelError> {
    let timestamps = series.dropna().timestamps();
    let resolution = infer_resolution(&timestamps)?;

    let gaps: Vec<ContinuityGap> = timestamps
        .windows(2)
        .filter(|w| w[1] - w[0] != resolution)
        .map(|w| ContinuityGap {
            date_from: w[0],
            date_to: w[1],
            days_lost: (w[1] - w[0]).num_milliseconds() as f64 / 86_400_000.0,
        })
        .collect();

    tracing::debug!(
        "found {} continuity gaps at resolution {}",
        gaps.len(),
        resolution
    );

    Ok(gaps)
}

/// Aggregated value and coverage of one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverageRow {
    /// Window start
    pub timestamp: Timestamp,
    /// Aggregated value (`NaN` for an empty window)
    pub value: f64,
    /// Fraction of expected samples present
    pub coverage: f64,
}

/// Per-window aggregate and coverage of a single series.
pub fn get_coverage(
    series: &TimeSeries,
    period: AveragingPeriod,
    aggregation: &AggregationMethod,
) -> Result<Vec<CoverageRow>, CorrelError> {
    let resampled = resample_with_coverage(series, period, aggregation)?;
    Ok(resampled
        .values
        .iter()
        .zip(resampled.coverage.iter())
        .map(|(v, c)| CoverageRow {
            timestamp: v.timestamp,
            value: v.value,
            coverage: c.value,
        })
        .collect())
}

/// Concurrent windows of two series with both coverages, without a threshold.
pub fn get_concurrent_coverage(
    reference: &TimeSeries,
    target: &TimeSeries,
    period: AveragingPeriod,
    aggregation_ref: AggregationMethod,
    aggregation_target: AggregationMethod,
) -> Result<Vec<ConcurrentCoverageRow>, CorrelError> {
    let settings = PreprocessSettings {
        averaging_period: period,
        coverage_threshold: 0.0,
        aggregation_ref,
        aggregation_target,
    };
    ResamplingPreprocessor.concurrent_coverage(reference, target, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> Timestamp {
        NaiveDate::from_ymd_opt(2021, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_no_gaps_in_regular_series() {
        let series = TimeSeries::regular(t0(), TimeDelta::minutes(10), &[1.0; 50]).unwrap();
        assert!(get_time_continuity_gaps(&series).unwrap().is_empty());
    }

    #[test]
    fn test_missing_readings_form_gap() {
        let mut values = vec![1.0; 24];
        values[5] = f64::NAN;
        values[6] = f64::NAN;
        let series = TimeSeries::regular(t0(), TimeDelta::hours(1), &values).unwrap();

        let gaps = get_time_continuity_gaps(&series).unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].date_from, t0() + TimeDelta::hours(4));
        assert_eq!(gaps[0].date_to, t0() + TimeDelta::hours(7));
        assert!((gaps[0].days_lost - 3.0 / 24.0).abs() < 1e-12);
        assert_eq!(gaps[0].duration(), TimeDelta::hours(3));
    }

    #[test]
    fn test_coverage_rows() {
        let mut values = vec![2.0; 12];
        values[0] = f64::NAN;
        let series = TimeSeries::regular(t0(), TimeDelta::minutes(10), &values).unwrap();

        let rows = get_coverage(&series, AveragingPeriod::hourly(), &AggregationMethod::Mean).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].coverage - 5.0 / 6.0).abs() < 1e-12);
        assert!((rows[1].coverage - 1.0).abs() < 1e-12);
        assert!((rows[0].value - 2.0).abs() < 1e-12);
    }
}
