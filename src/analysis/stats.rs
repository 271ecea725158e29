//! Summary statistics.

use std::fmt;

use crate::series::{TimeSeries, mean, sample_std};

/// Count, mean, standard deviation and range of a series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasicStats {
    /// Number of valid values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl fmt::Display for BasicStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count: {}, mean: {:.3}, std: {:.3}, min: {:.3}, max: {:.3}",
            self.count, self.mean, self.std, self.min, self.max
        )
    }
}

/// Statistics over the non-missing values; `NaN` fields when there are none.
pub fn get_basic_stats(series: &TimeSeries) -> BasicStats {
    let values = series.valid_values();
    if values.is_empty() {
        return BasicStats {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }

    BasicStats {
        count: values.len(),
        mean: mean(&values),
        std: sample_std(&values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
