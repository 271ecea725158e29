//! Circular binning of wind directions into sectors.
//!
//! The default layout is zero-centred: sector 1 straddles north, so with
//! 12 sectors it spans 345°–15°. The edge array therefore carries one
//! extra boundary (the split of sector 1 at 0°/360°):
//!
//! ```text
//! [0, 15, 45, 75, ..., 315, 345, 360]
//!  └─┘                          └───┘  both map to sector 1
//! ```
//!
//! Custom edge arrays are used as-is: `N + 1` edges give `N` sectors. An
//! angle past the last edge lands one slot beyond sector `N` and wraps to
//! sector 1, so custom edges ending below 360 send the uncovered arc to
//! sector 1.
//!
//! Directions are expected in [0, 360]. Nothing is reduced modulo 360 here;
//! NaN, angles below the first edge and angles more than one slot past the
//! last edge are reported as errors.

use crate::error::CorrelError;
use crate::series::{TimeSeries, Timestamp};

/// Direction sector layout (sector count, edges and labelling convention).
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionBins {
    sectors: usize,
    edges: Vec<f64>,
    zero_centered: bool,
}

impl DirectionBins {
    /// Zero-centred layout with `sectors` equal sectors.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `sectors` is zero.
    pub fn zero_centered(sectors: usize) -> Result<Self, CorrelError> {
        if sectors == 0 {
            return Err(CorrelError::InvalidConfig(
                "number of direction sectors must be positive".into(),
            ));
        }
        Ok(Self {
            sectors,
            edges: compute_bin_edges(sectors),
            zero_centered: true,
        })
    }

    /// Layout from explicit edges; `sectors = edges.len() - 1`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if fewer than two edges are given or the edges
    /// are not strictly increasing.
    pub fn custom(edges: Vec<f64>) -> Result<Self, CorrelError> {
        if edges.len() < 2 {
            return Err(CorrelError::InvalidConfig(format!(
                "direction bin array needs at least 2 edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CorrelError::InvalidConfig(
                "direction bin edges must be finite and strictly increasing".into(),
            ));
        }
        Ok(Self {
            sectors: edges.len() - 1,
            edges,
            zero_centered: false,
        })
    }

    /// Custom edges when given, otherwise the zero-centred default.
    pub fn from_options(sectors: usize, custom_edges: Option<&[f64]>) -> Result<Self, CorrelError> {
        match custom_edges {
            Some(edges) => Self::custom(edges.to_vec()),
            None => Self::zero_centered(sectors),
        }
    }

    /// Number of sectors.
    #[inline]
    pub fn sectors(&self) -> usize {
        self.sectors
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// True when sector 1 straddles 0°.
    #[inline]
    pub fn is_zero_centered(&self) -> bool {
        self.zero_centered
    }

    /// 1-based sector id for a direction.
    pub fn assign(&self, angle: f64) -> Result<usize, CorrelError> {
        assign_sector(angle, &self.edges, self.sectors)
    }

    /// Sector labels, index `i` labelling sector `i + 1`.
    pub fn labels(&self) -> Vec<String> {
        direction_bin_labels(self.sectors, &self.edges, self.zero_centered)
    }

    /// Label of a 1-based sector id.
    pub fn label(&self, sector: usize) -> Option<String> {
        self.labels().into_iter().nth(sector.checked_sub(1)?)
    }

    /// Sector id for every non-missing point of a direction series.
    pub fn bin_direction_series(&self, directions: &TimeSeries) -> Result<Vec<(Timestamp, usize)>, CorrelError> {
        directions
            .iter()
            .filter(|p| !p.is_missing())
            .map(|p| Ok((p.timestamp, self.assign(p.value)?)))
            .collect()
    }
}

/// Zero-centred edges: 0, then `180/N` stepping by `360/N` below 360, then 360.
pub fn compute_bin_edges(sectors: usize) -> Vec<f64> {
    let width = 360.0 / sectors as f64;
    let mut edges = Vec::with_capacity(sectors + 2);
    edges.push(0.0);
    edges.extend((0..sectors).map(|i| width / 2.0 + i as f64 * width));
    edges.push(360.0);
    edges
}

/// Map a direction onto a 1-based sector id.
///
/// Intervals are `[e_i, e_{i+1})`, except that an angle equal to the largest
/// edge falls in the last interval. An index of `sectors + 1` (the slice of
/// sector 1 just below 360°) wraps to 1.
pub fn assign_sector(angle: f64, edges: &[f64], sectors: usize) -> Result<usize, CorrelError> {
    let (Some(&min), Some(&max)) = (edges.first(), edges.last()) else {
        return Err(CorrelError::InvalidConfig("empty direction bin edges".into()));
    };
    let out_of_range = CorrelError::DirectionOutOfRange { angle, min, max };
    if angle.is_nan() {
        return Err(out_of_range);
    }

    let index = if angle == max {
        edges.partition_point(|&e| e < angle)
    } else {
        edges.partition_point(|&e| e <= angle)
    };

    match index {
        i if i == sectors + 1 => Ok(1),
        i if (1..=sectors).contains(&i) => Ok(i),
        _ => Err(out_of_range),
    }
}

/// `"{lower}-{upper}"` labels for each sector.
pub fn direction_bin_labels(sectors: usize, edges: &[f64], zero_centered: bool) -> Vec<String> {
    (0..sectors.min(edges.len().saturating_sub(1)))
        .map(|i| {
            if i == 0 && zero_centered && edges.len() >= 2 {
                format!(
                    "{}-{}",
                    format_edge(edges[edges.len() - 2]),
                    format_edge(edges[1])
                )
            } else {
                format!("{}-{}", format_edge(edges[i]), format_edge(edges[i + 1]))
            }
        })
        .collect()
}

/// Whole numbers keep one decimal place, matching float labels like `345.0`.
pub(crate) fn format_edge(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Signed difference `target - reference` wrapped to [-180, 180].
pub fn direction_veer(reference: f64, target: f64) -> f64 {
    let veer = target - reference;
    if veer > 180.0 {
        veer - 360.0
    } else if veer < -180.0 {
        veer + 360.0
    } else {
        veer
    }
}

/// Reduce a direction to [0, 360).
pub fn normalize_direction(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid of a tiny negative angle rounds up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit-vector mean of directions in degrees, in [0, 360).
pub fn circular_mean(directions: &[f64]) -> f64 {
    if directions.is_empty() {
        return f64::NAN;
    }
    let (sin_sum, cos_sum) = directions.iter().fold((0.0, 0.0), |(s, c), d| {
        let r = d.to_radians();
        (s + r.sin(), c + r.cos())
    });
    normalize_direction(sin_sum.atan2(cos_sum).to_degrees())
}
