//! Multiple linear regression.
//!
//! Fits `target = offset + Σᵢ slopeᵢ · refᵢ` by solving the normal equations
//!
//! ```text
//! (AᵀA) β = Aᵀy,   A = [1, ref₁, ref₂, ...]
//! ```
//!
//! with a full-pivot LU decomposition.

use faer::{Mat, linalg::solvers::Solve};

use crate::error::CorrelError;
use crate::plot::{PlotOutcome, PlotRequest, Plotter, ScatterPlot};
use crate::series::{TimeSeries, TimeSeriesPoint, align};
use crate::transform::{MultiConcurrentDataset, Preprocessor, ResamplingPreprocessor};

use super::{CorrelationConfig, CorrelationModel, MultiLinearParams, coefficient_of_determination};

/// Relative residual of the normal equations above which a solve is rejected.
const SOLVE_TOLERANCE: f64 = 1e-8;

/// Determinant of the predictor correlation matrix below which predictors
/// are treated as collinear.
const COLLINEARITY_TOLERANCE: f64 = 1e-12;

/// Linear regression of one target on several reference series.
#[derive(Clone, Debug)]
pub struct MultipleLinearRegression {
    predictors: Vec<TimeSeries>,
    target: TimeSeries,
    config: CorrelationConfig,
    data: MultiConcurrentDataset,
    averaged_predictors: Vec<TimeSeries>,
    params: Option<MultiLinearParams>,
}

impl MultipleLinearRegression {
    /// Preprocess predictors and target with the default preprocessor.
    pub fn new(
        ref_spd: &[&TimeSeries],
        target_spd: &TimeSeries,
        config: CorrelationConfig,
    ) -> Result<Self, CorrelError> {
        Self::with_preprocessor(ref_spd, target_spd, config, &ResamplingPreprocessor)
    }

    /// Preprocess predictors and target with a caller-supplied preprocessor.
    ///
    /// # Errors
    /// - `InvalidInput` when no predictors are given
    /// - `DimensionMismatch` when preprocessing is disabled and the series
    ///   lengths disagree
    /// - `InsufficientData` when no concurrent rows remain
    pub fn with_preprocessor(
        ref_spd: &[&TimeSeries],
        target_spd: &TimeSeries,
        config: CorrelationConfig,
        preprocessor: &dyn Preprocessor,
    ) -> Result<Self, CorrelError> {
        config.validate()?;
        if ref_spd.is_empty() {
            return Err(CorrelError::InvalidInput("at least one predictor is required".into()));
        }

        let (data, averaged_predictors) = if config.preprocess {
            let data = preprocessor.preprocess_multiple(ref_spd, target_spd, &config.settings())?;
            let averaged = ref_spd
                .iter()
                .map(|s| preprocessor.average(s, config.averaging_period, &config.aggregation_ref))
                .collect::<Result<Vec<_>, _>>()?;
            (data, averaged)
        } else {
            if let Some(bad) = ref_spd.iter().find(|s| s.len() != target_spd.len()) {
                return Err(CorrelError::dimension_mismatch(
                    format!("{} values per predictor", target_spd.len()),
                    format!("{} values", bad.len()),
                ));
            }
            let mut all: Vec<&TimeSeries> = ref_spd.to_vec();
            all.push(target_spd);
            let data = MultiConcurrentDataset::from_aligned(align(&all));
            (data, ref_spd.iter().map(|s| (*s).clone()).collect())
        };

        if data.is_empty() {
            return Err(CorrelError::insufficient(format!(
                "no concurrent data at {} with coverage >= {}",
                config.averaging_period, config.coverage_threshold
            )));
        }

        Ok(Self {
            predictors: ref_spd.iter().map(|s| (*s).clone()).collect(),
            target: target_spd.clone(),
            config,
            data,
            averaged_predictors,
            params: None,
        })
    }

    /// Fitted parameters.
    pub fn params(&self) -> Option<&MultiLinearParams> {
        self.params.as_ref()
    }

    /// Concurrent rows.
    pub fn data(&self) -> &MultiConcurrentDataset {
        &self.data
    }

    /// Number of predictor series.
    pub fn n_predictors(&self) -> usize {
        self.predictors.len()
    }

    /// Predictor inputs as given.
    pub fn predictors(&self) -> &[TimeSeries] {
        &self.predictors
    }

    /// Target input as given.
    pub fn target(&self) -> &TimeSeries {
        &self.target
    }

    fn fitted(&self, operation: &'static str) -> Result<&MultiLinearParams, CorrelError> {
        self.params.as_ref().ok_or(CorrelError::UnfitModel { operation })
    }

    /// Apply the fitted model to predictor series joined on timestamps.
    ///
    /// `None` uses the full predictor records averaged to the model's period.
    /// Rows where any predictor is missing are dropped.
    ///
    /// # Errors
    /// - `UnfitModel` before `run()`
    /// - `DimensionMismatch` when the number of inputs differs from the
    ///   number of predictors
    pub fn synthesize(&self, inputs: Option<&[&TimeSeries]>) -> Result<TimeSeries, CorrelError> {
        let params = self.fitted("synthesize")?;
        let inputs: Vec<&TimeSeries> = match inputs {
            Some(given) => given.to_vec(),
            None => self.averaged_predictors.iter().collect(),
        };
        if inputs.len() != params.slopes.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} predictor series", params.slopes.len()),
                format!("{} series", inputs.len()),
            ));
        }

        let aligned = align(&inputs);
        let mut row = vec![0.0; inputs.len()];
        let points = aligned
            .timestamps
            .iter()
            .enumerate()
            .map(|(i, &timestamp)| {
                for (k, column) in aligned.columns.iter().enumerate() {
                    row[k] = column[i];
                }
                TimeSeriesPoint::new(timestamp, params.apply(&row))
            })
            .collect();
        Ok(TimeSeries::from_sorted_points(points))
    }
}

/// Least-squares coefficients `[offset, slope_1, ..., slope_p]`.
fn solve_normal_equations(predictors: &[Vec<f64>], target: &[f64]) -> Result<Vec<f64>, CorrelError> {
    let n_data = target.len();
    let n_unknowns = predictors.len() + 1;

    if let Some(bad) = predictors.iter().find(|p| p.len() != n_data) {
        return Err(CorrelError::dimension_mismatch(
            format!("{n_data} values per predictor"),
            format!("{} values", bad.len()),
        ));
    }
    if n_data < n_unknowns {
        return Err(CorrelError::insufficient(format!(
            "need at least {n_unknowns} concurrent points to fit {} predictors, got {n_data}",
            predictors.len()
        )));
    }
    check_collinearity(predictors)?;

    // Design row k: [1, x_1k, x_2k, ...]
    let column = |j: usize, k: usize| if j == 0 { 1.0 } else { predictors[j - 1][k] };

    let mut ata = Mat::<f64>::zeros(n_unknowns, n_unknowns);
    for i in 0..n_unknowns {
        for j in i..n_unknowns {
            let sum: f64 = (0..n_data).map(|k| column(i, k) * column(j, k)).sum();
            ata[(i, j)] = sum;
            ata[(j, i)] = sum;
        }
    }

    let mut aty = Mat::<f64>::zeros(n_unknowns, 1);
    for i in 0..n_unknowns {
        aty[(i, 0)] = (0..n_data).map(|k| column(i, k) * target[k]).sum();
    }

    let lu = ata.as_ref().full_piv_lu();
    let x = lu.solve(&aty);

    let beta: Vec<f64> = (0..n_unknowns).map(|i| x[(i, 0)]).collect();
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(CorrelError::fit("normal equations are singular"));
    }

    // Reject solves that do not satisfy the system they came from
    let mut residual = 0.0;
    let mut scale = 0.0;
    for i in 0..n_unknowns {
        let lhs: f64 = (0..n_unknowns).map(|j| ata[(i, j)] * beta[j]).sum();
        residual += (lhs - aty[(i, 0)]).powi(2);
        scale += aty[(i, 0)].powi(2);
    }
    if residual.sqrt() > SOLVE_TOLERANCE * scale.sqrt().max(1.0) {
        return Err(CorrelError::fit("normal equations are ill-conditioned"));
    }

    Ok(beta)
}

/// Reject constant or linearly dependent predictors.
fn check_collinearity(predictors: &[Vec<f64>]) -> Result<(), CorrelError> {
    let p = predictors.len();
    let centred: Vec<Vec<f64>> = predictors
        .iter()
        .map(|col| {
            let m = col.iter().sum::<f64>() / col.len().max(1) as f64;
            col.iter().map(|v| v - m).collect()
        })
        .collect();
    let norms: Vec<f64> = centred
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    if let Some(i) = norms.iter().position(|&n| n == 0.0) {
        return Err(CorrelError::fit(format!("predictor {i} is constant")));
    }

    let r = Mat::<f64>::from_fn(p, p, |i, j| {
        let dot: f64 = centred[i].iter().zip(centred[j].iter()).map(|(a, b)| a * b).sum();
        dot / (norms[i] * norms[j])
    });
    let det = r.as_ref().determinant();

    if det.abs() < COLLINEARITY_TOLERANCE {
        return Err(CorrelError::fit("predictors are collinear"));
    }
    Ok(())
}

impl CorrelationModel for MultipleLinearRegression {
    fn name(&self) -> &'static str {
        "Multiple Linear Regression"
    }

    fn run(&mut self) -> Result<(), CorrelError> {
        let beta = solve_normal_equations(self.data.predictors(), self.data.target())?;
        let mut params = MultiLinearParams {
            slopes: beta[1..].to_vec(),
            offset: beta[0],
            r2: f64::NAN,
            num_data_pts: self.data.len(),
        };

        let predicted: Vec<f64> = (0..self.data.len())
            .map(|k| {
                let row: Vec<f64> = self.data.predictors().iter().map(|c| c[k]).collect();
                params.apply(&row)
            })
            .collect();
        params.r2 = coefficient_of_determination(&predicted, self.data.target());

        tracing::debug!(
            "MLR fit: {} predictors, offset={:.4}, r2={:.4}, n={}",
            params.slopes.len(),
            params.offset,
            params.r2,
            params.num_data_pts
        );

        self.params = Some(params);
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn num_data_pts(&self) -> usize {
        self.data.len()
    }

    fn coverage_threshold(&self) -> f64 {
        self.config.coverage_threshold
    }

    fn show_params(&self) -> Result<String, CorrelError> {
        Ok(self.fitted("show_params")?.to_string())
    }

    fn concurrent_predictions(&self) -> Result<(Vec<f64>, Vec<f64>), CorrelError> {
        let params = self.fitted("concurrent_predictions")?;
        let predicted = (0..self.data.len())
            .map(|k| {
                let row: Vec<f64> = self.data.predictors().iter().map(|c| c[k]).collect();
                params.apply(&row)
            })
            .collect();
        Ok((predicted, self.data.target().to_vec()))
    }

    fn plot(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError> {
        let params = self.fitted("plot")?;
        if params.slopes.len() > 1 {
            return Ok(PlotOutcome::Unsupported(
                "Cannot plot Multiple Linear Regression".to_string(),
            ));
        }

        let (slope, offset) = (params.slopes[0], params.offset);
        let scatter = ScatterPlot::new(self.name(), self.data.predictors()[0].clone(), self.data.target().to_vec())
            .with_fit(50, |x| offset + slope * x);
        plotter.draw(PlotRequest::Scatter(scatter))?;
        Ok(PlotOutcome::Rendered)
    }
}
