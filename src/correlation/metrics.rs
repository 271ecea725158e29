//! Fit-quality metrics over concurrent residuals.

use std::fmt;

use crate::error::CorrelError;

/// Residual statistics of a fitted model against the concurrent target.
///
/// Residuals are `predicted - observed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorMetrics {
    /// Root mean square error: sqrt(mean(residual²))
    pub rmse: f64,
    /// Mean absolute error: mean(|residual|)
    pub mae: f64,
    /// Bias (mean residual)
    pub bias: f64,
    /// Sample standard deviation of the residuals
    pub residual_std: f64,
    /// Pearson correlation of predicted and observed, in [-1, 1]
    pub correlation: f64,
    /// Coefficient of determination: 1 - SS_res / SS_tot
    pub r2: f64,
    /// Largest absolute residual
    pub max_error: f64,
    /// Number of data points
    pub n_points: usize,
}

impl ErrorMetrics {
    /// Compute metrics for predictions against observations.
    ///
    /// # Errors
    /// - `DimensionMismatch` if the slices differ in length
    /// - `InsufficientData` if they are empty
    pub fn compute(predicted: &[f64], observed: &[f64]) -> Result<Self, CorrelError> {
        if predicted.len() != observed.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} predictions", observed.len()),
                format!("{} predictions", predicted.len()),
            ));
        }
        if predicted.is_empty() {
            return Err(CorrelError::insufficient("no concurrent points to score"));
        }

        let n = predicted.len() as f64;
        let pred_mean = predicted.iter().sum::<f64>() / n;
        let obs_mean = observed.iter().sum::<f64>() / n;

        let residuals: Vec<f64> = predicted
            .iter()
            .zip(observed.iter())
            .map(|(&p, &o)| p - o)
            .collect();

        let bias = residuals.iter().sum::<f64>() / n;
        let ss_res: f64 = residuals.iter().map(|e| e * e).sum();
        let rmse = (ss_res / n).sqrt();
        let mae = residuals.iter().map(|e| e.abs()).sum::<f64>() / n;
        let max_error = residuals.iter().map(|e| e.abs()).fold(0.0, f64::max);
        let residual_std = if residuals.len() > 1 {
            (residuals.iter().map(|e| (e - bias).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        let pred_var: f64 = predicted.iter().map(|&p| (p - pred_mean).powi(2)).sum::<f64>() / n;
        let obs_var: f64 = observed.iter().map(|&o| (o - obs_mean).powi(2)).sum::<f64>() / n;
        let covariance: f64 = predicted
            .iter()
            .zip(observed.iter())
            .map(|(&p, &o)| (p - pred_mean) * (o - obs_mean))
            .sum::<f64>()
            / n;

        let correlation = if pred_var > 1e-12 && obs_var > 1e-12 {
            covariance / (pred_var.sqrt() * obs_var.sqrt())
        } else if pred_var <= 1e-12 && obs_var <= 1e-12 {
            1.0 // Both constant
        } else {
            0.0
        };

        Ok(Self {
            rmse,
            mae,
            bias,
            residual_std,
            correlation,
            r2: coefficient_of_determination(predicted, observed),
            max_error,
            n_points: predicted.len(),
        })
    }
}

impl fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RMSE          {:.6}", self.rmse)?;
        writeln!(f, "MAE           {:.6}", self.mae)?;
        writeln!(f, "Bias          {:.6}", self.bias)?;
        writeln!(f, "Residual std  {:.6}", self.residual_std)?;
        writeln!(f, "Correlation   {:.6}", self.correlation)?;
        writeln!(f, "r2            {:.6}", self.r2)?;
        write!(f, "Data points   {}", self.n_points)
    }
}

/// `1 - SS_res / SS_tot` of predictions against observations.
///
/// Constant observations score 1 when predicted exactly and 0 otherwise.
/// Returns `NaN` for empty or mismatched input.
pub fn coefficient_of_determination(predicted: &[f64], observed: &[f64]) -> f64 {
    if predicted.is_empty() || predicted.len() != observed.len() {
        return f64::NAN;
    }
    let obs_mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_res: f64 = predicted
        .iter()
        .zip(observed.iter())
        .map(|(&p, &o)| (o - p).powi(2))
        .sum();
    let ss_tot: f64 = observed.iter().map(|&o| (o - obs_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}
