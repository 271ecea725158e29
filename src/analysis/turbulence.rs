//! Turbulence intensity (TI = σ_speed / speed) summaries.

use chrono::{Datelike, Timelike};

use crate::direction::{DirectionBins, compute_bin_edges, direction_bin_labels};
use crate::error::CorrelError;
use crate::series::{TimeSeries, align, mean, quantile, sample_std};

/// Quantile used for the representative TI.
const REPRESENTATIVE_QUANTILE: f64 = 0.9;

/// TI statistics for one integer speed bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiBySpeedRow {
    /// Bin centre in m/s; the bin is `[bin - 0.5, bin + 0.5)`
    pub speed_bin: u32,
    /// Mean TI
    pub mean_ti: f64,
    /// Samples in the bin
    pub count: usize,
    /// Sample standard deviation of the speed standard deviations
    pub sigma_sigma: f64,
    /// `mean_ti + sigma_sigma / speed_bin`, 0 for bin 0
    pub char_ti: f64,
    /// 90th percentile of TI
    pub rep_ti: f64,
}

/// TI statistics grouped into 1 m/s bins centred on whole numbers (0 to 40).
///
/// Rows with a non-finite TI (zero speed) or a speed outside
/// `[-0.5, 40.5]` are skipped.
pub fn get_ti_by_speed(speed: &TimeSeries, std: &TimeSeries) -> Result<Vec<TiBySpeedRow>, CorrelError> {
    const MAX_BIN: usize = 40;

    let aligned = align(&[speed, std]);
    let mut ti_groups: Vec<Vec<f64>> = vec![Vec::new(); MAX_BIN + 1];
    let mut std_groups: Vec<Vec<f64>> = vec![Vec::new(); MAX_BIN + 1];

    for (&spd, &sd) in aligned.columns[0].iter().zip(aligned.columns[1].iter()) {
        let ti = sd / spd;
        if !ti.is_finite() || !(-0.5..=MAX_BIN as f64 + 0.5).contains(&spd) {
            continue;
        }
        let bin = ((spd + 0.5).floor() as usize).min(MAX_BIN);
        ti_groups[bin].push(ti);
        std_groups[bin].push(sd);
    }

    let rows: Vec<TiBySpeedRow> = ti_groups
        .iter()
        .zip(std_groups.iter())
        .enumerate()
        .filter(|(_, (ti, _))| !ti.is_empty())
        .map(|(bin, (ti, sd))| {
            let mean_ti = mean(ti);
            let sigma_sigma = sample_std(sd);
            let char_ti = if bin == 0 {
                0.0
            } else {
                mean_ti + sigma_sigma / bin as f64
            };
            TiBySpeedRow {
                speed_bin: bin as u32,
                mean_ti,
                count: ti.len(),
                sigma_sigma,
                char_ti,
                rep_ti: quantile(ti, REPRESENTATIVE_QUANTILE),
            }
        })
        .collect();

    if rows.is_empty() {
        return Err(CorrelError::insufficient("no valid turbulence intensity values"));
    }
    Ok(rows)
}

/// Mean TI for one direction sector.
#[derive(Clone, Debug, PartialEq)]
pub struct TiBySectorRow {
    /// 1-based sector id
    pub sector: usize,
    /// Zero-centred sector label
    pub label: String,
    /// Mean TI
    pub mean_ti: f64,
    /// Samples in the sector
    pub count: usize,
}

/// Mean TI per zero-centred direction sector, for speeds at least `min_speed`.
///
/// Only sectors with data are returned.
///
/// # Errors
/// Returns `DirectionOutOfRange` for directions outside [0, 360].
pub fn get_ti_by_sector(
    speed: &TimeSeries,
    std: &TimeSeries,
    direction: &TimeSeries,
    sectors: usize,
    min_speed: f64,
) -> Result<Vec<TiBySectorRow>, CorrelError> {
    if sectors == 0 {
        return Err(CorrelError::InvalidConfig("number of sectors must be positive".into()));
    }
    let width = 360.0 / sectors as f64;
    let uniform = DirectionBins::custom((0..=sectors).map(|i| i as f64 * width).collect())?;
    let labels = direction_bin_labels(sectors, &compute_bin_edges(sectors), true);

    let aligned = align(&[speed, std, direction]);
    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); sectors];
    for i in 0..aligned.len() {
        let (spd, sd, dir) = (aligned.columns[0][i], aligned.columns[1][i], aligned.columns[2][i]);
        if spd < min_speed {
            continue;
        }
        if !(0.0..=360.0).contains(&dir) {
            return Err(CorrelError::DirectionOutOfRange { angle: dir, min: 0.0, max: 360.0 });
        }
        // Shift by half a sector so sector 1 starts at 0 on the uniform grid
        let mut rotated = dir + width / 2.0;
        if rotated >= 360.0 {
            rotated -= 360.0;
        }
        groups[uniform.assign(rotated)? - 1].push(sd / spd);
    }

    Ok(groups
        .iter()
        .zip(labels)
        .enumerate()
        .filter(|(_, (g, _))| !g.is_empty())
        .map(|(i, (g, label))| TiBySectorRow {
            sector: i + 1,
            label,
            mean_ti: mean(g),
            count: g.len(),
        })
        .collect())
}

/// Mean TI by hour of day (rows) and calendar month (columns).
#[derive(Clone, Debug, PartialEq)]
pub struct TiMatrix {
    /// `values[hour][month0]`, `NaN` where no data
    pub values: [[f64; 12]; 24],
}

impl TiMatrix {
    /// Mean TI for an hour (0-23) and month (1-12).
    pub fn get(&self, hour: usize, month: usize) -> Option<f64> {
        self.values.get(hour)?.get(month.checked_sub(1)?).copied()
    }
}

/// 24x12 hour-by-month matrix of mean TI.
pub fn get_12x24_ti_matrix(speed: &TimeSeries, std: &TimeSeries) -> Result<TiMatrix, CorrelError> {
    let aligned = align(&[speed, std]);
    let mut sums = [[0.0_f64; 12]; 24];
    let mut counts = [[0_usize; 12]; 24];

    for (i, ts) in aligned.timestamps.iter().enumerate() {
        let ti = aligned.columns[1][i] / aligned.columns[0][i];
        if !ti.is_finite() {
            continue;
        }
        let (h, m) = (ts.hour() as usize, ts.month0() as usize);
        sums[h][m] += ti;
        counts[h][m] += 1;
    }

    if counts.iter().flatten().all(|&c| c == 0) {
        return Err(CorrelError::insufficient("no valid turbulence intensity values"));
    }

    let mut values = [[f64::NAN; 12]; 24];
    for h in 0..24 {
        for m in 0..12 {
            if counts[h][m] > 0 {
                values[h][m] = sums[h][m] / counts[h][m] as f64;
            }
        }
    }
    Ok(TiMatrix { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    const TOL: f64 = 1e-10;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TimeSeries::regular(start, TimeDelta::minutes(10), values).unwrap()
    }

    #[test]
    fn test_ti_by_speed_bins() {
        let speed = series(&[4.9, 5.2, 5.4, 0.0, 10.0]);
        let std = series(&[0.49, 0.52, 1.08, 0.3, 1.0]);
        let rows = get_ti_by_speed(&speed, &std).unwrap();

        // Zero speed gives infinite TI and is skipped
        assert_eq!(rows.len(), 2);
        let five = rows[0];
        assert_eq!(five.speed_bin, 5);
        assert_eq!(five.count, 3);
        assert!((five.mean_ti - (0.1 + 0.1 + 0.2) / 3.0).abs() < TOL);
        let ss = sample_std(&[0.49, 0.52, 1.08]);
        assert!((five.sigma_sigma - ss).abs() < TOL);
        assert!((five.char_ti - (five.mean_ti + ss / 5.0)).abs() < TOL);
        assert!((five.rep_ti - quantile(&[0.1, 0.1, 0.2], 0.9)).abs() < TOL);

        assert_eq!(rows[1].speed_bin, 10);
        assert!(rows[1].sigma_sigma.is_nan());
    }

    #[test]
    fn test_ti_by_sector() {
        let speed = series(&[10.0, 10.0, 10.0, 2.0]);
        let std = series(&[1.0, 2.0, 1.5, 1.0]);
        let dir = series(&[355.0, 5.0, 90.0, 90.0]);
        let rows = get_ti_by_sector(&speed, &std, &dir, 4, 3.0).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sector, 1);
        assert_eq!(rows[0].label, "315.0-45.0");
        assert!((rows[0].mean_ti - 0.15).abs() < TOL);
        assert_eq!(rows[1].sector, 2);
        assert_eq!(rows[1].count, 1);
    }

    #[test]
    fn test_ti_matrix() {
        let speed = series(&[10.0; 12]);
        let std = series(&[1.0; 12]);
        let matrix = get_12x24_ti_matrix(&speed, &std).unwrap();

        assert!((matrix.get(0, 3).unwrap() - 0.1).abs() < TOL);
        assert!((matrix.get(1, 3).unwrap() - 0.1).abs() < TOL);
        assert!(matrix.get(2, 3).unwrap().is_nan());
        assert!(matrix.get(0, 0).is_none());
    }
}
