//! Simple speed ratio: target scales with the reference by the ratio of their means.

use crate::error::CorrelError;
use crate::plot::{PlotOutcome, Plotter};
use crate::series::{TimeSeries, mean};
use crate::transform::ConcurrentInputs;

use super::{
    CorrelationBase, CorrelationConfig, CorrelationModel, RatioParams, SpeedPredictor, concurrent_scatter,
};

/// `target = ratio · ref` with `ratio = mean(target) / mean(ref)`.
#[derive(Clone, Debug)]
pub struct SimpleSpeedRatio {
    base: CorrelationBase,
    params: Option<RatioParams>,
}

impl SimpleSpeedRatio {
    /// Preprocess the two speed series and build an unfit model.
    pub fn new(
        ref_spd: &TimeSeries,
        target_spd: &TimeSeries,
        config: CorrelationConfig,
    ) -> Result<Self, CorrelError> {
        Ok(Self::from_base(CorrelationBase::new(
            ConcurrentInputs::speeds(ref_spd, target_spd),
            config,
        )?))
    }

    /// Unfit model over existing concurrent data.
    pub fn from_base(base: CorrelationBase) -> Self {
        Self { base, params: None }
    }

    /// Fitted parameters.
    pub fn params(&self) -> Option<&RatioParams> {
        self.params.as_ref()
    }

    fn fitted(&self, operation: &'static str) -> Result<&RatioParams, CorrelError> {
        self.params.as_ref().ok_or(CorrelError::UnfitModel { operation })
    }
}

impl CorrelationModel for SimpleSpeedRatio {
    fn name(&self) -> &'static str {
        "Simple Speed Ratio"
    }

    fn run(&mut self) -> Result<(), CorrelError> {
        let data = self.base.data();
        let ref_mean = mean(&data.ref_spd());
        if ref_mean == 0.0 || !ref_mean.is_finite() {
            return Err(CorrelError::fit(format!(
                "speed ratio undefined for reference mean {ref_mean}"
            )));
        }
        let ratio = mean(&data.target_spd()) / ref_mean;

        tracing::debug!("speed ratio: {:.4} over {} points", ratio, data.len());

        self.params = Some(RatioParams {
            ratio,
            num_data_pts: data.len(),
        });
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn num_data_pts(&self) -> usize {
        self.base.num_data_pts()
    }

    fn coverage_threshold(&self) -> f64 {
        self.base.coverage_threshold()
    }

    fn show_params(&self) -> Result<String, CorrelError> {
        Ok(self.fitted("show_params")?.to_string())
    }

    fn concurrent_predictions(&self) -> Result<(Vec<f64>, Vec<f64>), CorrelError> {
        let ratio = self.fitted("concurrent_predictions")?.ratio;
        let data = self.base.data();
        Ok((data.ref_spd().iter().map(|x| x * ratio).collect(), data.target_spd()))
    }

    fn plot(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError> {
        let ratio = self.fitted("plot")?.ratio;
        plotter.draw(concurrent_scatter(self.name(), self.base.data(), |x| x * ratio))?;
        Ok(PlotOutcome::Rendered)
    }
}

impl SpeedPredictor for SimpleSpeedRatio {
    fn base(&self) -> &CorrelationBase {
        &self.base
    }

    fn predict_value(&self, x: f64) -> Result<f64, CorrelError> {
        Ok(self.fitted("predict")?.ratio * x)
    }
}
