//! Window reducers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CorrelError;

/// Signature of a user-supplied reducer.
pub type CustomReducer = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// How values inside an averaging window are reduced to one number.
///
/// Reducers receive only non-missing values.
#[derive(Clone, Default)]
pub enum AggregationMethod {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Sum (0 for an empty window)
    Sum,
    /// Sample standard deviation (ddof = 1)
    Std,
    /// Maximum
    Max,
    /// Minimum
    Min,
    /// Number of non-missing values
    Count,
    /// User-supplied reducer
    Custom(Arc<CustomReducer>),
}

impl AggregationMethod {
    /// Wrap a closure as a reducer.
    pub fn custom(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Reduce a window of non-missing values.
    ///
    /// Empty windows give 0 for `Sum` and `Count` and `NaN` otherwise.
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Self::Count => values.len() as f64,
            Self::Sum => values.iter().sum(),
            _ if values.is_empty() => f64::NAN,
            Self::Mean => mean(values),
            Self::Std => sample_std(values),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Custom(f) => f(values),
        }
    }

    /// Short name used in tables and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Std => "std",
            Self::Max => "max",
            Self::Min => "min",
            Self::Count => "count",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = CorrelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "std" => Ok(Self::Std),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "count" => Ok(Self::Count),
            other => Err(CorrelError::Parse(format!(
                "unknown aggregation method '{other}'"
            ))),
        }
    }
}

/// Arithmetic mean, `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, `NaN` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_builtin_reducers() {
        let values = [1.0, 2.0, 3.0, 4.0];

        assert!((AggregationMethod::Mean.apply(&values) - 2.5).abs() < TOL);
        assert!((AggregationMethod::Sum.apply(&values) - 10.0).abs() < TOL);
        assert!((AggregationMethod::Max.apply(&values) - 4.0).abs() < TOL);
        assert!((AggregationMethod::Min.apply(&values) - 1.0).abs() < TOL);
        assert!((AggregationMethod::Count.apply(&values) - 4.0).abs() < TOL);
        assert!((AggregationMethod::Std.apply(&values) - 1.290_994_448_735_805_6).abs() < TOL);
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(AggregationMethod::Count.apply(&[]), 0.0);
        assert_eq!(AggregationMethod::Sum.apply(&[]), 0.0);
        assert!(AggregationMethod::Mean.apply(&[]).is_nan());
    }

    #[test]
    fn test_custom_reducer() {
        let range = AggregationMethod::custom(|v| {
            let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = v.iter().copied().fold(f64::INFINITY, f64::min);
            max - min
        });
        assert!((range.apply(&[3.0, 7.0, 5.0]) - 4.0).abs() < TOL);
        assert_eq!(format!("{range:?}"), "Custom(..)");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("MEAN".parse::<AggregationMethod>().unwrap().name(), "mean");
        assert!("median".parse::<AggregationMethod>().is_err());
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!((quantile(&values, 0.9) - 9.1).abs() < TOL);
        assert!((quantile(&values, 0.5) - 5.5).abs() < TOL);
    }
}
