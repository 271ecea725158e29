//! Concurrent (aligned) datasets produced by preprocessing.

use crate::error::CorrelError;
use crate::series::{AlignedColumns, TimeSeries, TimeSeriesPoint, Timestamp};

/// One aligned row of reference and target data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConcurrentRow {
    /// Window start (or raw timestamp when not resampled)
    pub timestamp: Timestamp,
    /// Reference speed
    pub ref_spd: f64,
    /// Target speed
    pub target_spd: f64,
    /// Reference direction in degrees
    pub ref_dir: Option<f64>,
    /// Target direction in degrees
    pub target_dir: Option<f64>,
}

/// Aligned reference/target rows that passed the coverage filter.
///
/// Every row has finite speeds; when directions are present every row has
/// both of them. Timestamps are strictly increasing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConcurrentDataset {
    rows: Vec<ConcurrentRow>,
    has_directions: bool,
}

impl ConcurrentDataset {
    /// Build a dataset from rows, checking the invariants.
    pub fn from_rows(rows: Vec<ConcurrentRow>) -> Result<Self, CorrelError> {
        let has_directions = rows
            .first()
            .is_some_and(|r| r.ref_dir.is_some() || r.target_dir.is_some());

        for (i, row) in rows.iter().enumerate() {
            if !row.ref_spd.is_finite() || !row.target_spd.is_finite() {
                return Err(CorrelError::InvalidInput(format!(
                    "row {i} has a missing speed"
                )));
            }
            let dirs_complete = row.ref_dir.is_some_and(f64::is_finite)
                && row.target_dir.is_some_and(f64::is_finite);
            let dirs_absent = row.ref_dir.is_none() && row.target_dir.is_none();
            if (has_directions && !dirs_complete) || (!has_directions && !dirs_absent) {
                return Err(CorrelError::InvalidInput(format!(
                    "row {i} has incomplete direction data"
                )));
            }
            if i > 0 && row.timestamp <= rows[i - 1].timestamp {
                return Err(CorrelError::NonMonotonic { index: i });
            }
        }

        Ok(Self {
            rows,
            has_directions,
        })
    }

    /// Rows from aligned columns ordered `[ref_spd, target_spd, ref_dir?, target_dir?]`.
    pub(crate) fn from_aligned(aligned: AlignedColumns) -> Self {
        let has_directions = aligned.columns.len() >= 4;
        let rows = aligned
            .timestamps
            .iter()
            .enumerate()
            .map(|(i, &timestamp)| ConcurrentRow {
                timestamp,
                ref_spd: aligned.columns[0][i],
                target_spd: aligned.columns[1][i],
                ref_dir: has_directions.then(|| aligned.columns[2][i]),
                target_dir: has_directions.then(|| aligned.columns[3][i]),
            })
            .collect();

        Self {
            rows,
            has_directions,
        }
    }

    /// Number of concurrent rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows are concurrent.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Access the rows.
    pub fn rows(&self) -> &[ConcurrentRow] {
        &self.rows
    }

    /// True when rows carry directions.
    pub fn has_directions(&self) -> bool {
        self.has_directions
    }

    /// Row timestamps.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    /// Reference speed column.
    pub fn ref_spd(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ref_spd).collect()
    }

    /// Target speed column.
    pub fn target_spd(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.target_spd).collect()
    }

    /// Reference direction column.
    pub fn ref_dir(&self) -> Option<Vec<f64>> {
        self.has_directions
            .then(|| self.rows.iter().filter_map(|r| r.ref_dir).collect())
    }

    /// Target direction column.
    pub fn target_dir(&self) -> Option<Vec<f64>> {
        self.has_directions
            .then(|| self.rows.iter().filter_map(|r| r.target_dir).collect())
    }

    /// Reference speeds as a series.
    pub fn ref_series(&self) -> TimeSeries {
        self.column_series(|r| r.ref_spd)
    }

    /// Target speeds as a series.
    pub fn target_series(&self) -> TimeSeries {
        self.column_series(|r| r.target_spd)
    }

    fn column_series(&self, f: impl Fn(&ConcurrentRow) -> f64) -> TimeSeries {
        TimeSeries::from_sorted_points(
            self.rows
                .iter()
                .map(|r| TimeSeriesPoint::new(r.timestamp, f(r)))
                .collect(),
        )
    }
}

/// Aligned predictors and target for multiple linear regression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiConcurrentDataset {
    timestamps: Vec<Timestamp>,
    predictors: Vec<Vec<f64>>,
    target: Vec<f64>,
}

impl MultiConcurrentDataset {
    /// Rows from aligned columns ordered `[predictor_1, ..., predictor_n, target]`.
    pub(crate) fn from_aligned(mut aligned: AlignedColumns) -> Self {
        let target = aligned.columns.pop().unwrap_or_default();
        Self {
            timestamps: aligned.timestamps,
            predictors: aligned.columns,
            target,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no rows are concurrent.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of predictor columns.
    pub fn n_predictors(&self) -> usize {
        self.predictors.len()
    }

    /// Row timestamps.
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Predictor columns in input order.
    pub fn predictors(&self) -> &[Vec<f64>] {
        &self.predictors
    }

    /// Target column.
    pub fn target(&self) -> &[f64] {
        &self.target
    }
}
