//! Error type shared by the correlation models and analysis utilities.

use thiserror::Error;

/// Errors raised while preparing data, fitting models or synthesizing series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelError {
    /// Not enough rows left to do the requested computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A fitted-model operation was called before `run()`.
    #[error("Model has not been fitted: call run() before {operation}")]
    UnfitModel { operation: &'static str },

    /// Operation that has no meaning for this model shape.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Series or predictor counts that should agree do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Numerical fit failure (degenerate or singular system).
    #[error("Fit failed: {0}")]
    Fit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data does not satisfy a precondition.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Direction not covered by the bin edges.
    #[error("Direction {angle} lies outside the bin edges [{min}, {max}]")]
    DirectionOutOfRange { angle: f64, min: f64, max: f64 },

    /// Text that could not be parsed (periods, dates).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timestamps not strictly increasing.
    #[error("Non-monotonic timestamp at index {index}")]
    NonMonotonic { index: usize },
}

impl CorrelError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an insufficient data error.
    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    /// Create a fit error.
    pub fn fit(message: impl Into<String>) -> Self {
        Self::Fit(message.into())
    }
}
