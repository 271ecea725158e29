//! Shared state of every two-series correlation model.

use crate::direction::circular_mean;
use crate::error::CorrelError;
use crate::series::{AggregationMethod, AveragingPeriod, TimeSeries};
use crate::transform::{
    ConcurrentDataset, ConcurrentInputs, Preprocessor, ResamplingPreprocessor, align_without_resampling,
};

use super::config::CorrelationConfig;

/// Inputs, configuration and concurrent data of a correlation model.
///
/// Construction runs the preprocessing step once; the resulting
/// [`ConcurrentDataset`] is owned here and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct CorrelationBase {
    ref_spd: TimeSeries,
    target_spd: TimeSeries,
    ref_dir: Option<TimeSeries>,
    target_dir: Option<TimeSeries>,
    config: CorrelationConfig,
    data: ConcurrentDataset,
    averaged_ref_spd: TimeSeries,
    averaged_ref_dir: Option<TimeSeries>,
}

impl CorrelationBase {
    /// Build with the default [`ResamplingPreprocessor`].
    pub fn new(inputs: ConcurrentInputs<'_>, config: CorrelationConfig) -> Result<Self, CorrelError> {
        Self::with_preprocessor(inputs, config, &ResamplingPreprocessor)
    }

    /// Build with a caller-supplied preprocessor.
    ///
    /// # Errors
    /// - `InvalidConfig` for out-of-range settings
    /// - `InsufficientData` when no concurrent rows survive preprocessing
    pub fn with_preprocessor(
        inputs: ConcurrentInputs<'_>,
        config: CorrelationConfig,
        preprocessor: &dyn Preprocessor,
    ) -> Result<Self, CorrelError> {
        config.validate()?;

        let data = if config.preprocess {
            preprocessor.preprocess(&inputs, &config.settings())?
        } else {
            align_without_resampling(&inputs)?
        };

        if data.is_empty() {
            return Err(CorrelError::insufficient(format!(
                "no concurrent data at {} with coverage >= {}",
                config.averaging_period, config.coverage_threshold
            )));
        }

        let (averaged_ref_spd, averaged_ref_dir) = if config.preprocess {
            let spd = preprocessor.average(inputs.ref_spd, config.averaging_period, &config.aggregation_ref)?;
            let dir = inputs
                .ref_dir
                .map(|d| {
                    preprocessor.average(
                        d,
                        config.averaging_period,
                        &AggregationMethod::custom(circular_mean),
                    )
                })
                .transpose()?;
            (spd, dir)
        } else {
            (inputs.ref_spd.clone(), inputs.ref_dir.cloned())
        };

        tracing::debug!(
            "correlation base: {} concurrent points at {}",
            data.len(),
            config.averaging_period
        );

        Ok(Self {
            ref_spd: inputs.ref_spd.clone(),
            target_spd: inputs.target_spd.clone(),
            ref_dir: inputs.ref_dir.cloned(),
            target_dir: inputs.target_dir.cloned(),
            config,
            data,
            averaged_ref_spd,
            averaged_ref_dir,
        })
    }

    /// Number of concurrent rows.
    pub fn num_data_pts(&self) -> usize {
        self.data.len()
    }

    /// Coverage threshold used in preprocessing.
    pub fn coverage_threshold(&self) -> f64 {
        self.config.coverage_threshold
    }

    /// Averaging period used in preprocessing.
    pub fn averaging_period(&self) -> AveragingPeriod {
        self.config.averaging_period
    }

    /// Model configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Concurrent rows.
    pub fn data(&self) -> &ConcurrentDataset {
        &self.data
    }

    /// Reference speed input as given.
    pub fn ref_spd(&self) -> &TimeSeries {
        &self.ref_spd
    }

    /// Target speed input as given.
    pub fn target_spd(&self) -> &TimeSeries {
        &self.target_spd
    }

    /// Reference direction input as given.
    pub fn ref_dir(&self) -> Option<&TimeSeries> {
        self.ref_dir.as_ref()
    }

    /// Target direction input as given.
    pub fn target_dir(&self) -> Option<&TimeSeries> {
        self.target_dir.as_ref()
    }

    /// Full reference speed record at the averaging period, without a coverage filter.
    ///
    /// This is the default synthesis input.
    pub fn averaged_reference(&self) -> &TimeSeries {
        &self.averaged_ref_spd
    }

    /// Full reference direction record at the averaging period (vector mean).
    pub fn averaged_reference_direction(&self) -> Option<&TimeSeries> {
        self.averaged_ref_dir.as_ref()
    }

    /// Placeholder error metric of an unfitted model; always 0.
    pub fn get_error_metrics(&self) -> f64 {
        0.0
    }
}
