//! Orthogonal (total) least squares.
//!
//! Both reference and target carry measurement noise, so the line minimises
//! perpendicular distance. The slope is the principal axis of the centred
//! scatter:
//!
//! ```text
//! slope = (Syy − Sxx + √((Syy − Sxx)² + 4·Sxy²)) / (2·Sxy)
//! ```

use crate::error::CorrelError;
use crate::plot::{PlotOutcome, Plotter};
use crate::series::TimeSeries;
use crate::transform::ConcurrentInputs;

use super::{
    CorrelationBase, CorrelationConfig, CorrelationModel, LinearParams, Moments, SpeedPredictor,
    calc_target_value_by_linear_model, coefficient_of_determination, concurrent_scatter,
};

/// Straight-line fit minimising perpendicular residuals.
#[derive(Clone, Debug)]
pub struct OrthogonalLeastSquares {
    base: CorrelationBase,
    params: Option<LinearParams>,
}

impl OrthogonalLeastSquares {
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

fn principal_axis(x: &[f64], y: &[f64]) -> Result<(f64, f64), CorrelError> {
    let m = Moments::compute(x, y)?;
    if m.sxy == 0.0 {
        return Err(CorrelError::fit(
            "reference and target are uncorrelated, principal axis is undefined",
        ));
    }
    let d = m.syy - m.sxx;
    let slope = (d + (d * d + 4.0 * m.sxy * m.sxy).sqrt()) / (2.0 * m.sxy);
    Ok((slope, m.y_mean - slope * m.x_mean))
}

impl CorrelationModel for OrthogonalLeastSquares {
    fn name(&self) -> &'static str {
        "Orthogonal Least Squares"
    }

    fn run(&mut self) -> Result<(), CorrelError> {
        let x = self.base.data().ref_spd();
        let y = self.base.data().target_spd();
        let (slope, offset) = principal_axis(&x, &y)?;

        let predicted: Vec<f64> = x
            .iter()
            .map(|&v| calc_target_value_by_linear_model(v, slope, offset))
            .collect();
        let r2 = coefficient_of_determination(&predicted, &y);

        tracing::debug!(
            "orthogonal fit: slope={:.4}, offset={:.4}, r2={:.4}, n={}",
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

impl SpeedPredictor for OrthogonalLeastSquares {
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
    use crate::correlation::ols::ols_line;
    use chrono::{NaiveDate, TimeDelta};

    const TOL: f64 = 1e-10;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TimeSeries::regular(start, TimeDelta::minutes(10), values).unwrap()
    }

    #[test]
    fn test_exact_line_recovered() {
        let x: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 3.0).collect();
        let (slope, offset) = principal_axis(&x, &y).unwrap();

        assert!((slope - 2.0).abs() < TOL);
        assert!((offset + 3.0).abs() < TOL);
    }

    #[test]
    fn test_steeper_than_ols_with_noisy_reference() {
        // Alternating perturbation of the reference attenuates the OLS slope
        let x: Vec<f64> = (0..40).map(|i| i as f64 * 0.5 + if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let y: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();

        let (ols_slope, _) = ols_line(&x, &y).unwrap();
        let (odr_slope, _) = principal_axis(&x, &y).unwrap();
        assert!(odr_slope > ols_slope, "odr {odr_slope} vs ols {ols_slope}");
    }

    #[test]
    fn test_run_and_r2() {
        let x: Vec<f64> = (0..30).map(|i| 3.0 + (i % 9) as f64).collect();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 1.1 * v + (i % 3) as f64 * 0.2).collect();
        let mut odr =
            OrthogonalLeastSquares::new(&series(&x), &series(&y), CorrelationConfig::ten_minute()).unwrap();
        odr.run().unwrap();

        let p = odr.params().unwrap();
        assert_eq!(odr.get_r2().unwrap(), p.r2);
        assert!(p.r2 > 0.9 && p.r2 <= 1.0);
    }

    #[test]
    fn test_uncorrelated_fails() {
        assert!(matches!(
            principal_axis(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]),
            Err(CorrelError::Fit(_))
        ));
    }
}
