//! The concurrent-data preprocessor seam and its default implementation.

use chrono::TimeDelta;

use super::{
    ConcurrentDataset, MultiConcurrentDataset, ResampledSeries, infer_resolution,
    resample_with_resolution,
};
use crate::direction::circular_mean;
use crate::error::CorrelError;
use crate::series::{AggregationMethod, AveragingPeriod, TimeSeries, Timestamp, align};

/// Reference and target series handed to a preprocessor.
#[derive(Clone, Copy, Debug)]
pub struct ConcurrentInputs<'a> {
    /// Reference speed
    pub ref_spd: &'a TimeSeries,
    /// Target speed
    pub target_spd: &'a TimeSeries,
    /// Reference direction (degrees)
    pub ref_dir: Option<&'a TimeSeries>,
    /// Target direction (degrees)
    pub target_dir: Option<&'a TimeSeries>,
}

impl<'a> ConcurrentInputs<'a> {
    /// Speed-only inputs.
    pub fn speeds(ref_spd: &'a TimeSeries, target_spd: &'a TimeSeries) -> Self {
        Self {
            ref_spd,
            target_spd,
            ref_dir: None,
            target_dir: None,
        }
    }

    /// Attach reference and target directions.
    pub fn with_directions(mut self, ref_dir: &'a TimeSeries, target_dir: &'a TimeSeries) -> Self {
        self.ref_dir = Some(ref_dir);
        self.target_dir = Some(target_dir);
        self
    }

    /// True when both direction series are present.
    pub fn has_directions(&self) -> bool {
        self.ref_dir.is_some() && self.target_dir.is_some()
    }

    fn check_directions(&self) -> Result<(), CorrelError> {
        if self.ref_dir.is_some() != self.target_dir.is_some() {
            return Err(CorrelError::InvalidInput(
                "reference and target directions must be given together".into(),
            ));
        }
        Ok(())
    }
}

/// Resampling parameters shared by all preprocessing calls.
#[derive(Clone, Debug)]
pub struct PreprocessSettings {
    /// Common averaging window
    pub averaging_period: AveragingPeriod,
    /// Minimum fraction of expected samples per window, in [0, 1]
    pub coverage_threshold: f64,
    /// Reducer for reference windows
    pub aggregation_ref: AggregationMethod,
    /// Reducer for target windows
    pub aggregation_target: AggregationMethod,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            averaging_period: AveragingPeriod::monthly(),
            coverage_threshold: 0.9,
            aggregation_ref: AggregationMethod::Mean,
            aggregation_target: AggregationMethod::Mean,
        }
    }
}

impl PreprocessSettings {
    /// Settings for `period` with a given coverage threshold and mean reducers.
    pub fn new(averaging_period: AveragingPeriod, coverage_threshold: f64) -> Self {
        Self {
            averaging_period,
            coverage_threshold,
            ..Self::default()
        }
    }

    /// Check that the coverage threshold is a fraction.
    pub fn validate(&self) -> Result<(), CorrelError> {
        if !(0.0..=1.0).contains(&self.coverage_threshold) {
            return Err(CorrelError::InvalidConfig(format!(
                "coverage threshold must be in [0, 1], got {}",
                self.coverage_threshold
            )));
        }
        Ok(())
    }
}

/// Concurrent window with coverage of both series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConcurrentCoverageRow {
    /// Window start
    pub timestamp: Timestamp,
    /// Aggregated reference value
    pub ref_value: f64,
    /// Aggregated target value
    pub target_value: f64,
    /// Reference coverage (`ref_Coverage`)
    pub ref_coverage: f64,
    /// Target coverage (`target_Coverage`)
    pub target_coverage: f64,
}

/// Builds aligned, coverage-filtered data for the correlation models.
pub trait Preprocessor {
    /// Aligned reference/target rows (with directions when supplied).
    fn preprocess(
        &self,
        inputs: &ConcurrentInputs<'_>,
        settings: &PreprocessSettings,
    ) -> Result<ConcurrentDataset, CorrelError>;

    /// Aligned predictor columns and target for multiple regression.
    fn preprocess_multiple(
        &self,
        predictors: &[&TimeSeries],
        target: &TimeSeries,
        settings: &PreprocessSettings,
    ) -> Result<MultiConcurrentDataset, CorrelError>;

    /// Concurrent windows with per-series coverage, without threshold filtering.
    fn concurrent_coverage(
        &self,
        reference: &TimeSeries,
        target: &TimeSeries,
        settings: &PreprocessSettings,
    ) -> Result<Vec<ConcurrentCoverageRow>, CorrelError>;

    /// Series averaged to `period` without any coverage filter.
    fn average(
        &self,
        series: &TimeSeries,
        period: AveragingPeriod,
        method: &AggregationMethod,
    ) -> Result<TimeSeries, CorrelError> {
        Ok(super::resample_with_coverage(series, period, method)?.values)
    }
}

/// Default preprocessor: trims both series to their overlap, averages them onto
/// a common window grid and keeps windows that meet the coverage threshold.
///
/// Directions are averaged as unit vectors so that windows straddling north do
/// not average to south.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResamplingPreprocessor;

impl ResamplingPreprocessor {
    fn resample_overlap(
        series: &TimeSeries,
        window: (Timestamp, Timestamp),
        period: AveragingPeriod,
        method: &AggregationMethod,
    ) -> Result<ResampledSeries, CorrelError> {
        let resolution = native_resolution(series)?;
        let trimmed = series.dropna().between(window.0, window.1);
        resample_with_resolution(&trimmed, period, method, resolution)
    }
}

impl Preprocessor for ResamplingPreprocessor {
    fn preprocess(
        &self,
        inputs: &ConcurrentInputs<'_>,
        settings: &PreprocessSettings,
    ) -> Result<ConcurrentDataset, CorrelError> {
        settings.validate()?;
        inputs.check_directions()?;

        let window = overlap_window(&[inputs.ref_spd, inputs.target_spd], settings.averaging_period)?;
        let period = settings.averaging_period;
        let threshold = settings.coverage_threshold;

        let mut columns = vec![
            Self::resample_overlap(inputs.ref_spd, window, period, &settings.aggregation_ref)?
                .filtered(threshold),
            Self::resample_overlap(inputs.target_spd, window, period, &settings.aggregation_target)?
                .filtered(threshold),
        ];

        if let (Some(ref_dir), Some(target_dir)) = (inputs.ref_dir, inputs.target_dir) {
            let vector_mean = AggregationMethod::custom(circular_mean);
            columns.push(Self::resample_overlap(ref_dir, window, period, &vector_mean)?.filtered(threshold));
            columns.push(
                Self::resample_overlap(target_dir, window, period, &vector_mean)?.filtered(threshold),
            );
        }

        let refs: Vec<&TimeSeries> = columns.iter().collect();
        let dataset = ConcurrentDataset::from_aligned(align(&refs));

        tracing::debug!(
            "preprocessed {} concurrent rows at {} (coverage >= {:.2})",
            dataset.len(),
            period,
            threshold
        );

        Ok(dataset)
    }

    fn preprocess_multiple(
        &self,
        predictors: &[&TimeSeries],
        target: &TimeSeries,
        settings: &PreprocessSettings,
    ) -> Result<MultiConcurrentDataset, CorrelError> {
        settings.validate()?;
        if predictors.is_empty() {
            return Err(CorrelError::InvalidInput("at least one predictor is required".into()));
        }

        let mut all: Vec<&TimeSeries> = predictors.to_vec();
        all.push(target);
        let window = overlap_window(&all, settings.averaging_period)?;
        let period = settings.averaging_period;

        let mut columns = Vec::with_capacity(all.len());
        for predictor in predictors {
            columns.push(
                Self::resample_overlap(predictor, window, period, &settings.aggregation_ref)?
                    .filtered(settings.coverage_threshold),
            );
        }
        columns.push(
            Self::resample_overlap(target, window, period, &settings.aggregation_target)?
                .filtered(settings.coverage_threshold),
        );

        let refs: Vec<&TimeSeries> = columns.iter().collect();
        Ok(MultiConcurrentDataset::from_aligned(align(&refs)))
    }

    fn concurrent_coverage(
        &self,
        reference: &TimeSeries,
        target: &TimeSeries,
        settings: &PreprocessSettings,
    ) -> Result<Vec<ConcurrentCoverageRow>, CorrelError> {
        let window = overlap_window(&[reference, target], settings.averaging_period)?;
        let period = settings.averaging_period;

        let ref_r = Self::resample_overlap(reference, window, period, &settings.aggregation_ref)?;
        let target_r = Self::resample_overlap(target, window, period, &settings.aggregation_target)?;

        let aligned = align(&[&ref_r.values, &target_r.values, &ref_r.coverage, &target_r.coverage]);
        Ok((0..aligned.len())
            .map(|i| ConcurrentCoverageRow {
                timestamp: aligned.timestamps[i],
                ref_value: aligned.columns[0][i],
                target_value: aligned.columns[1][i],
                ref_coverage: aligned.columns[2][i],
                target_coverage: aligned.columns[3][i],
            })
            .collect())
    }
}

/// Inner join of already aligned series, used when preprocessing is disabled.
///
/// Directions are joined when both are given. No coverage filtering is applied.
pub fn align_without_resampling(inputs: &ConcurrentInputs<'_>) -> Result<ConcurrentDataset, CorrelError> {
    inputs.check_directions()?;

    let mut series = vec![inputs.ref_spd, inputs.target_spd];
    if let (Some(ref_dir), Some(target_dir)) = (inputs.ref_dir, inputs.target_dir) {
        series.push(ref_dir);
        series.push(target_dir);
    }
    Ok(ConcurrentDataset::from_aligned(align(&series)))
}

fn native_resolution(series: &TimeSeries) -> Result<TimeDelta, CorrelError> {
    infer_resolution(&series.dropna().timestamps())
}

/// Window-aligned span where all series have data: from the start of the
/// window holding the latest first reading to the last instant before the
/// window after the earliest last reading.
fn overlap_window(
    series: &[&TimeSeries],
    period: AveragingPeriod,
) -> Result<(Timestamp, Timestamp), CorrelError> {
    let mut start: Option<Timestamp> = None;
    let mut end: Option<Timestamp> = None;

    for s in series {
        let valid = s.dropna();
        let (Some(first), Some(last)) = (valid.first_timestamp(), valid.last_timestamp()) else {
            return Err(CorrelError::insufficient(format!(
                "series {} has no valid data",
                s.name().unwrap_or("<unnamed>")
            )));
        };
        start = Some(start.map_or(first, |st| st.max(first)));
        end = Some(end.map_or(last, |en| en.min(last)));
    }

    match (start, end) {
        (Some(start), Some(end)) if start <= end => {
            let window_start = period.window_start(start)?;
            let window_end = period.next_window_start(period.window_start(end)?)? - TimeDelta::nanoseconds(1);
            Ok((window_start, window_end))
        }
        _ => Err(CorrelError::insufficient(
            "reference and target series do not overlap in time",
        )),
    }
}
