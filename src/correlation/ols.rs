//! Ordinary least squares.
//!
//! Minimises vertical residuals of target against reference:
//!
//! ```text
//! slope  = Sxy / Sxx
//! offset = ȳ − slope·x̄
//! ```

use crate::error::CorrelError;
use crate::plot::{PlotOutcome, Plotter};
use crate::series::TimeSeries;
use crate::transform::ConcurrentInputs;

use super::{
    CorrelationBase, CorrelationConfig, CorrelationModel, LinearParams, Moments, SpeedPredictor,
    calc_target_value_by_linear_model, coefficient_of_determination, concurrent_scatter,
};

/// Straight-line fit minimising vertical residuals.
#[derive(Clone, Debug)]
pub struct OrdinaryLeastSquares {
    base: CorrelationBase,
    params: Option<LinearParams>,
}

impl OrdinaryLeastSquares {
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
    pub fn params(&self) -> Option<&LinearParams> {
        self.params.as_ref()
    }

    fn fitted(&self, operation: &'static str) -> Result<&LinearParams, CorrelError> {
        self.params.as_ref().ok_or(CorrelError::UnfitModel { operation })
    }
}

/// `(slope, offset)` minimising vertical residuals.
pub(crate) fn ols_line(x: &[f64], y: &[f64]) -> Result<(f64, f64), CorrelError> {
    let m = Moments::compute(x, y)?;
    if m.sxx == 0.0 {
        return Err(CorrelError::fit("reference values are constant, slope is undefined"));
    }
    let slope = m.sxy / m.sxx;
    Ok((slope, m.y_mean - slope * m.x_mean))
}

impl CorrelationModel for OrdinaryLeastSquares {
    fn name(&self) -> &'static str {
        "Ordinary Least Squares"
    }

    fn run(&mut self) -> Result<(), CorrelError> {
        let x = self.base.data().ref_spd();
        let y = self.base.data().target_spd();
        let (slope, offset) = ols_line(&x, &y)?;

        let predicted: Vec<f64> = x
            .iter()
            .map(|&v| calc_target_value_by_linear_model(v, slope, offset))
            .collect();
        let r2 = coefficient_of_determination(&predicted, &y);

        tracing::debug!(
            "OLS fit: slope={:.4}, offset={:.4}, r2={:.4}, n={}",
            slope,
            offset,
            r2,
            x.len()
        );

        self.params = Some(LinearParams {
            slope,
            offset,
            r2,
            num_data_pts: x.len(),
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
        let params = self.fitted("concurrent_predictions")?;
        let data = self.base.data();
        Ok((
            data.ref_spd().iter().map(|&x| params.apply(x)).collect(),
            data.target_spd(),
        ))
    }

    fn plot(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError> {
        let params = *self.fitted("plot")?;
        plotter.draw(concurrent_scatter(self.name(), self.base.data(), |x| params.apply(x)))?;
        Ok(PlotOutcome::Rendered)
    }
}

impl SpeedPredictor for OrdinaryLeastSquares {
    fn base(&self) -> &CorrelationBase {
        &self.base
    }

    fn predict_value(&self, x: f64) -> Result<f64, CorrelError> {
        Ok(self.fitted("predict")?.apply(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    const TOL: f64 = 1e-10;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TimeSeries::regular(start, TimeDelta::minutes(10), values).unwrap()
    }

    fn model(x: &[f64], y: &[f64]) -> OrdinaryLeastSquares {
        OrdinaryLeastSquares::new(&series(x), &series(y), CorrelationConfig::ten_minute()).unwrap()
    }

    #[test]
    fn test_exact_line_recovered() {
        let x: Vec<f64> = (0..20).map(|i| 2.0 + i as f64 * 0.7).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v + 1.0).collect();
        let mut ols = model(&x, &y);
        ols.run().unwrap();

        let p = ols.params().unwrap();
        assert!((p.slope - 0.5).abs() < TOL, "slope = {}", p.slope);
        assert!((p.offset - 1.0).abs() < TOL, "offset = {}", p.offset);
        assert!((p.r2 - 1.0).abs() < TOL);
        assert_eq!(p.num_data_pts, 20);
        assert_eq!(ols.get_r2().unwrap(), p.r2);
    }

    #[test]
    fn test_unfit_errors() {
        let ols = model(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(!ols.is_fitted());
        assert!(matches!(ols.synthesize(None), Err(CorrelError::UnfitModel { .. })));
        assert!(matches!(ols.predict_value(1.0), Err(CorrelError::UnfitModel { .. })));
        assert!(matches!(ols.get_r2(), Err(CorrelError::UnfitModel { .. })));
        assert!(matches!(ols.show_params(), Err(CorrelError::UnfitModel { .. })));
    }

    #[test]
    fn test_constant_reference_fails() {
        let mut ols = model(&[4.0, 4.0, 4.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(ols.run(), Err(CorrelError::Fit(_))));
        assert!(!ols.is_fitted());
    }

    #[test]
    fn test_synthesize_keeps_missing() {
        let mut ols = model(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]);
        ols.run().unwrap();

        let out = ols.synthesize(Some(&series(&[10.0, f64::NAN]))).unwrap();
        assert!((out.values()[0] - 21.0).abs() < TOL);
        assert!(out.values()[1].is_nan());
    }
}
