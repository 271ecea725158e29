//! Fitted parameter sets.

use std::fmt;

use super::calc_target_value_by_linear_model;

/// Slope, offset and fit quality of a straight-line model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearParams {
    /// Target change per unit reference
    pub slope: f64,
    /// Target at zero reference
    pub offset: f64,
    /// Coefficient of determination over the concurrent rows
    pub r2: f64,
    /// Concurrent rows used
    pub num_data_pts: usize,
}

impl LinearParams {
    /// Evaluate the line.
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        calc_target_value_by_linear_model(x, self.slope, self.offset)
    }
}

impl fmt::Display for LinearParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "slope            {}", self.slope)?;
        writeln!(f, "offset           {}", self.offset)?;
        writeln!(f, "r2               {}", self.r2)?;
        write!(f, "Num data points  {}", self.num_data_pts)
    }
}

/// Ratio of mean target to mean reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatioParams {
    /// `mean(target) / mean(ref)`
    pub ratio: f64,
    /// Concurrent rows used
    pub num_data_pts: usize,
}

impl fmt::Display for RatioParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ratio            {}", self.ratio)?;
        write!(f, "Num data points  {}", self.num_data_pts)
    }
}

/// Coefficients of a multiple linear regression.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiLinearParams {
    /// One slope per predictor, in predictor order
    pub slopes: Vec<f64>,
    /// Intercept
    pub offset: f64,
    /// Coefficient of determination over the concurrent rows
    pub r2: f64,
    /// Concurrent rows used
    pub num_data_pts: usize,
}

impl MultiLinearParams {
    /// Evaluate the model for one row of predictor values.
    pub fn apply(&self, row: &[f64]) -> f64 {
        self.offset + self.slopes.iter().zip(row.iter()).map(|(a, x)| a * x).sum::<f64>()
    }
}

impl fmt::Display for MultiLinearParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slope) in self.slopes.iter().enumerate() {
            writeln!(f, "slope[{i}]         {slope}")?;
        }
        writeln!(f, "offset           {}", self.offset)?;
        writeln!(f, "r2               {}", self.r2)?;
        write!(f, "Num data points  {}", self.num_data_pts)
    }
}
