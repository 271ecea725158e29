//! Sorted-speed line fit used inside each SpeedSort sector.

use crate::analysis::mean_of_monthly_means;
use crate::error::CorrelError;
use crate::series::{TimeSeries, align, mean};

/// Upper bound on the low-speed cutoff, m/s.
const MAX_CUTOFF: f64 = 4.0;

/// Reference speed below which a sector line is not used:
/// `min(0.5 · lt_ref_speed, 4)`.
pub fn speed_cutoff(lt_ref_speed: f64) -> f64 {
    (0.5 * lt_ref_speed).min(MAX_CUTOFF)
}

/// Line through the sorted reference and target speed distributions.
///
/// Reference and target speeds are sorted independently, points below the
/// cutoff are dropped, and the line passes through the means of the lower and
/// upper halves of what remains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorSpeedModel {
    /// Line slope
    pub slope: f64,
    /// Line offset
    pub offset: f64,
    /// Reference cutoff speed
    pub cutoff: f64,
    /// Smallest target speed kept by the cutoff
    pub target_cutoff: f64,
    /// Points used in the fit
    pub data_pts: usize,
}

impl SectorSpeedModel {
    /// Fit on two concurrent series joined on timestamps.
    ///
    /// The cutoff comes from `lt_ref_speed`, or from the MOMM of the aligned
    /// reference when none is given.
    pub fn new(
        ref_spd: &TimeSeries,
        target_spd: &TimeSeries,
        lt_ref_speed: Option<f64>,
    ) -> Result<Self, CorrelError> {
        let aligned = align(&[ref_spd, target_spd]);
        let lt_ref_speed = match lt_ref_speed {
            Some(lt) => lt,
            None => {
                let concurrent_ref = TimeSeries::new(&aligned.timestamps, &aligned.columns[0])?;
                mean_of_monthly_means(&concurrent_ref)?
            }
        };
        Self::fit(&aligned.columns[0], &aligned.columns[1], speed_cutoff(lt_ref_speed))
    }

    /// Fit on paired speeds with a given cutoff.
    ///
    /// If no reference speed reaches the cutoff all points are used.
    ///
    /// # Errors
    /// - `DimensionMismatch` if the slices differ in length
    /// - `InsufficientData` for fewer than two points
    /// - `Fit` when both halves have the same mean reference speed
    pub fn fit(ref_spd: &[f64], target_spd: &[f64], cutoff: f64) -> Result<Self, CorrelError> {
        if ref_spd.len() != target_spd.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} target speeds", ref_spd.len()),
                format!("{} target speeds", target_spd.len()),
            ));
        }

        let mut x = ref_spd.to_vec();
        let mut y = target_spd.to_vec();
        x.sort_by(f64::total_cmp);
        y.sort_by(f64::total_cmp);

        let start = x.iter().position(|&v| v >= cutoff).unwrap_or(0);
        let (x, y) = (&x[start..], &y[start..]);
        if x.len() < 2 {
            return Err(CorrelError::insufficient(format!(
                "sector fit needs at least 2 points above the cutoff, got {}",
                x.len()
            )));
        }

        let mid = x.len() / 2;
        let (xm1, xm2) = (mean(&x[..mid]), mean(&x[mid..]));
        let (ym1, ym2) = (mean(&y[..mid]), mean(&y[mid..]));
        if xm2 == xm1 {
            return Err(CorrelError::fit("sorted reference halves have equal means"));
        }
        let slope = (ym2 - ym1) / (xm2 - xm1);

        Ok(Self {
            slope,
            offset: ym1 - xm1 * slope,
            cutoff,
            target_cutoff: y[0],
            data_pts: x.len(),
        })
    }

    /// Target speed for a reference speed.
    ///
    /// Zero stays zero; below the cutoff the speed is scaled by
    /// `target_cutoff / cutoff`; above it the line is used.
    pub fn predict(&self, speed: f64) -> f64 {
        if speed == 0.0 {
            0.0
        } else if speed < self.cutoff && self.cutoff > 0.0 {
            speed * self.target_cutoff / self.cutoff
        } else {
            self.slope * speed + self.offset
        }
    }
}
