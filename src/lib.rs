//! # correl-rs
//!
//! Measure-correlate-predict (MCP) for wind resource assessment.
//!
//! This crate provides the building blocks for relating a short on-site
//! measurement to a long-term reference and predicting the long-term
//! site record:
//! - Time series with averaging periods and coverage-aware resampling
//! - Direction sector binning (zero-centred or custom edges)
//! - Correlation models (ordinary, orthogonal and multiple least squares,
//!   speed ratio, SpeedSort)
//! - Long-term reference speeds, continuity gaps and coverage
//! - Speed/direction distributions and turbulence intensity summaries

pub mod analysis;
pub mod correlation;
pub mod direction;
pub mod error;
pub mod plot;
pub mod series;
pub mod transform;

// Re-export main types for convenience
pub use error::CorrelError;
pub use series::{AggregationMethod, AveragingPeriod, TimeSeries, TimeSeriesPoint, Timestamp, align};

// Direction binning
pub use direction::{
    DirectionBins, assign_sector, circular_mean, compute_bin_edges, direction_bin_labels,
    direction_veer, normalize_direction,
};

// Preprocessing
pub use transform::{
    ConcurrentDataset, ConcurrentInputs, PreprocessSettings, Preprocessor, ResamplingPreprocessor,
};

// Correlation models
pub use correlation::{
    CorrelationBase, CorrelationConfig, CorrelationModel, ErrorMetrics, LinearParams,
    MultiLinearParams, MultipleLinearRegression, OrdinaryLeastSquares, OrthogonalLeastSquares,
    RatioParams, SectorParams, SectorResult, SimpleSpeedRatio, SpeedPredictor, SpeedSort,
    SpeedSortConfig, SpeedSortParams, calc_target_value_by_linear_model,
};

// Analysis types
pub use analysis::{
    BasicStats, ContinuityGap, DateInput, DistributionStat, FrequencyTable, SectorBinning,
    calc_lt_ref_speed, get_basic_stats, get_coverage, get_distribution,
    get_distribution_by_wind_sector, get_freq_table, get_ti_by_sector, get_ti_by_speed,
    get_time_continuity_gaps, mean_of_monthly_means,
};

// Plotting seam
pub use plot::{PlotOutcome, PlotRequest, Plotter, RecordingPlotter};
