//! Model configuration.

use crate::error::CorrelError;
use crate::series::{AggregationMethod, AveragingPeriod};
use crate::transform::PreprocessSettings;

/// Settings shared by every correlation model.
#[derive(Clone, Debug)]
pub struct CorrelationConfig {
    /// Window both series are averaged to before fitting.
    pub averaging_period: AveragingPeriod,
    /// Minimum fraction of expected samples a window needs, in [0, 1].
    pub coverage_threshold: f64,
    /// Reducer for reference windows.
    pub aggregation_ref: AggregationMethod,
    /// Reducer for target windows.
    pub aggregation_target: AggregationMethod,
    /// When false the inputs are joined on exact timestamps as given.
    pub preprocess: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self::monthly()
    }
}

impl CorrelationConfig {
    /// Monthly means, 90% coverage.
    ///
    /// - averaging_period: 1 month
    /// - coverage_threshold: 0.9
    /// - aggregation: mean for both series
    pub fn monthly() -> Self {
        Self {
            averaging_period: AveragingPeriod::monthly(),
            coverage_threshold: 0.9,
            aggregation_ref: AggregationMethod::Mean,
            aggregation_target: AggregationMethod::Mean,
            preprocess: true,
        }
    }

    /// Ten-minute concurrent data, 90% coverage.
    pub fn ten_minute() -> Self {
        Self::monthly().with_averaging_period(AveragingPeriod::ten_minutes())
    }

    /// Hourly means, 90% coverage.
    pub fn hourly() -> Self {
        Self::monthly().with_averaging_period(AveragingPeriod::hourly())
    }

    /// Daily means, 90% coverage.
    pub fn daily() -> Self {
        Self::monthly().with_averaging_period(AveragingPeriod::daily())
    }

    /// Set the averaging period.
    pub fn with_averaging_period(mut self, period: AveragingPeriod) -> Self {
        self.averaging_period = period;
        self
    }

    /// Set the coverage threshold.
    pub fn with_coverage_threshold(mut self, threshold: f64) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    /// Set the reference reducer.
    pub fn with_aggregation_ref(mut self, method: AggregationMethod) -> Self {
        self.aggregation_ref = method;
        self
    }

    /// Set the target reducer.
    pub fn with_aggregation_target(mut self, method: AggregationMethod) -> Self {
        self.aggregation_target = method;
        self
    }

    /// Use the input series as already concurrent.
    pub fn without_preprocessing(mut self) -> Self {
        self.preprocess = false;
        self
    }

    /// Preprocessing parameters.
    pub fn settings(&self) -> PreprocessSettings {
        PreprocessSettings {
            averaging_period: self.averaging_period,
            coverage_threshold: self.coverage_threshold,
            aggregation_ref: self.aggregation_ref.clone(),
            aggregation_target: self.aggregation_target.clone(),
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), CorrelError> {
        self.settings().validate()
    }
}

/// SpeedSort parameters.
#[derive(Clone, Debug)]
pub struct SpeedSortConfig {
    /// Number of zero-centred direction sectors (default 12).
    pub sectors: usize,
    /// Custom direction bin edges; overrides `sectors` when set.
    pub direction_bin_array: Option<Vec<f64>>,
    /// Long-term reference speed; defaults to the MOMM of the full reference record.
    pub lt_ref_speed: Option<f64>,
    /// Sectors with fewer speed-fit points are flagged low confidence (default 10).
    pub min_sector_points: usize,
    /// Spread calm-row directions evenly around the compass (default true).
    pub spread_calm_directions: bool,
}

impl Default for SpeedSortConfig {
    fn default() -> Self {
        Self {
            sectors: 12,
            direction_bin_array: None,
            lt_ref_speed: None,
            min_sector_points: 10,
            spread_calm_directions: true,
        }
    }
}

impl SpeedSortConfig {
    /// Set the number of zero-centred sectors.
    pub fn with_sectors(mut self, sectors: usize) -> Self {
        self.sectors = sectors;
        self
    }

    /// Set custom direction bin edges.
    pub fn with_direction_bin_array(mut self, edges: Vec<f64>) -> Self {
        self.direction_bin_array = Some(edges);
        self
    }

    /// Set the long-term reference speed.
    pub fn with_lt_ref_speed(mut self, speed: f64) -> Self {
        self.lt_ref_speed = Some(speed);
        self
    }

    /// Set the low-confidence threshold.
    pub fn with_min_sector_points(mut self, n: usize) -> Self {
        self.min_sector_points = n;
        self
    }

    /// Enable or disable calm-direction spreading.
    pub fn with_spread_calm_directions(mut self, spread: bool) -> Self {
        self.spread_calm_directions = spread;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), CorrelError> {
        if let Some(lt) = self.lt_ref_speed.filter(|lt| !(lt.is_finite() && *lt > 0.0)) {
            return Err(CorrelError::InvalidConfig(format!(
                "long-term reference speed must be positive, got {lt}"
            )));
        }
        if self.direction_bin_array.is_none() && self.sectors == 0 {
            return Err(CorrelError::InvalidConfig("number of sectors must be positive".into()));
        }
        Ok(())
    }
}
