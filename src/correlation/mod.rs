//! Measure-correlate-predict models.
//!
//! Every model follows the same lifecycle:
//!
//! ```text
//! new(inputs, config)  ──►  unfit  ──run()──►  fitted  ──synthesize()──►  TimeSeries
//!                                                 ▲            │
//!                                                 └────────────┘  (read-only, repeatable)
//! ```
//!
//! Construction preprocesses the inputs into concurrent rows (see
//! [`crate::transform`]). `run()` fits parameters on those rows. Anything that
//! needs parameters returns [`CorrelError::UnfitModel`] before `run()`.
//!
//! # Models
//!
//! | Model | Fit |
//! |-------|-----|
//! | [`OrdinaryLeastSquares`] | `y = a·x + b`, vertical residuals |
//! | [`OrthogonalLeastSquares`] | `y = a·x + b`, perpendicular residuals |
//! | [`MultipleLinearRegression`] | `y = b + Σ aᵢ·xᵢ` |
//! | [`SimpleSpeedRatio`] | `y = (ȳ / x̄)·x` |
//! | [`SpeedSort`] | one sorted-speed line and veer per direction sector |
//!
//! # Example
//!
//! ```ignore
//! use correl_rs::correlation::{CorrelationConfig, CorrelationModel, OrdinaryLeastSquares, SpeedPredictor};
//!
//! let mut ols = OrdinaryLeastSquares::new(&reference, &mast, CorrelationConfig::monthly())?;
//! ols.run()?;
//! println!("{}", ols.show_params()?);
//! let long_term = ols.synthesize(None)?;
//! ```

mod base;
mod config;
mod metrics;
mod multiple;
mod ols;
mod orthogonal;
mod params;
mod sector;
mod speed_ratio;
mod speed_sort;

pub use base::CorrelationBase;
pub use config::{CorrelationConfig, SpeedSortConfig};
pub use metrics::{ErrorMetrics, coefficient_of_determination};
pub use multiple::MultipleLinearRegression;
pub use ols::OrdinaryLeastSquares;
pub use orthogonal::OrthogonalLeastSquares;
pub use params::{LinearParams, MultiLinearParams, RatioParams};
pub use sector::{SectorSpeedModel, speed_cutoff};
pub use speed_ratio::SimpleSpeedRatio;
pub use speed_sort::{SectorParams, SectorResult, SpeedSort, SpeedSortParams};

use crate::error::CorrelError;
use crate::plot::{PlotOutcome, PlotRequest, Plotter, ScatterPlot};
use crate::series::{TimeSeries, TimeSeriesPoint};
use crate::transform::ConcurrentDataset;

/// Common interface of the fitted models.
pub trait CorrelationModel {
    /// Human-readable model name.
    fn name(&self) -> &'static str;

    /// Fit the model on its concurrent data. Re-running refits from the same data.
    fn run(&mut self) -> Result<(), CorrelError>;

    /// True once `run()` has succeeded.
    fn is_fitted(&self) -> bool;

    /// Number of concurrent rows.
    fn num_data_pts(&self) -> usize;

    /// Coverage threshold used in preprocessing.
    fn coverage_threshold(&self) -> f64;

    /// Fitted parameters as a printable table.
    fn show_params(&self) -> Result<String, CorrelError>;

    /// `(predicted, observed)` target values over the concurrent rows.
    fn concurrent_predictions(&self) -> Result<(Vec<f64>, Vec<f64>), CorrelError>;

    /// Coefficient of determination over the concurrent rows.
    fn get_r2(&self) -> Result<f64, CorrelError> {
        let (predicted, observed) = self.concurrent_predictions()?;
        Ok(coefficient_of_determination(&predicted, &observed))
    }

    /// Residual metrics over the concurrent rows.
    fn get_error_metrics(&self) -> Result<ErrorMetrics, CorrelError> {
        let (predicted, observed) = self.concurrent_predictions()?;
        ErrorMetrics::compute(&predicted, &observed)
    }

    /// Hand the model's figures to `plotter`.
    fn plot(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError>;
}

/// Models that map a single reference speed onto a target speed.
pub trait SpeedPredictor: CorrelationModel {
    /// Shared inputs and concurrent data.
    fn base(&self) -> &CorrelationBase;

    /// Predicted target speed for one reference speed.
    fn predict_value(&self, x: f64) -> Result<f64, CorrelError>;

    /// Predicted target speeds for many reference speeds.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, CorrelError> {
        x.iter().map(|&v| self.predict_value(v)).collect()
    }

    /// Apply the fitted model to a reference series.
    ///
    /// `None` uses the full reference record averaged to the model's period.
    /// Missing readings stay missing.
    fn synthesize(&self, input: Option<&TimeSeries>) -> Result<TimeSeries, CorrelError> {
        if !self.is_fitted() {
            return Err(CorrelError::UnfitModel {
                operation: "synthesize",
            });
        }
        let input = input.unwrap_or_else(|| self.base().averaged_reference());
        let points = input
            .iter()
            .map(|p| {
                let value = if p.is_missing() {
                    f64::NAN
                } else {
                    self.predict_value(p.value)?
                };
                Ok(TimeSeriesPoint::new(p.timestamp, value))
            })
            .collect::<Result<Vec<_>, CorrelError>>()?;
        Ok(TimeSeries::from_sorted_points(points))
    }
}

/// `ref · slope + offset`.
#[inline]
pub fn calc_target_value_by_linear_model(ref_value: f64, slope: f64, offset: f64) -> f64 {
    ref_value * slope + offset
}

/// Means and centred second moments of paired samples.
pub(crate) struct Moments {
    pub x_mean: f64,
    pub y_mean: f64,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
}

impl Moments {
    pub(crate) fn compute(x: &[f64], y: &[f64]) -> Result<Self, CorrelError> {
        if x.len() != y.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} target values", x.len()),
                format!("{} target values", y.len()),
            ));
        }
        if x.len() < 2 {
            return Err(CorrelError::insufficient(format!(
                "a linear fit needs at least 2 points, got {}",
                x.len()
            )));
        }

        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = y.iter().sum::<f64>() / n;
        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            let (dx, dy) = (xi - x_mean, yi - y_mean);
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        Ok(Self {
            x_mean,
            y_mean,
            sxx,
            syy,
            sxy,
        })
    }
}

/// Scatter of the concurrent rows with `f` sampled as the fit line.
pub(crate) fn concurrent_scatter(
    title: &str,
    data: &ConcurrentDataset,
    f: impl Fn(f64) -> f64,
) -> PlotRequest {
    PlotRequest::Scatter(ScatterPlot::new(title, data.ref_spd(), data.target_spd()).with_fit(50, f))
}
