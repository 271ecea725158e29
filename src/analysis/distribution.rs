//! Binned distributions, frequency tables and sector ratios.
//!
//! Value bins are right-open, `[b_i, b_{i+1})`; values outside the edges are
//! left out of every bin but still count towards percentage denominators.

use crate::direction::DirectionBins;
use crate::error::CorrelError;
use crate::series::{AggregationMethod, TimeSeries, align, mean};

/// What to report per bin.
#[derive(Clone, Debug, Default)]
pub enum DistributionStat {
    /// Share of all aligned rows falling in the bin, in percent
    #[default]
    PercentFrequency,
    /// Reducer applied to the values in the bin
    Aggregate(AggregationMethod),
}

/// One bin of a distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionBin {
    /// Bin label
    pub label: String,
    /// Lower edge
    pub lower: f64,
    /// Upper edge
    pub upper: f64,
    /// Number of values in the bin
    pub count: usize,
    /// Percent frequency or aggregated value
    pub value: f64,
}

/// Default wind speed bins: `[-0.5, 0.5), [0.5, 1.5), ..., [39.5, 40.5)`.
pub fn default_speed_bins() -> Vec<f64> {
    (0..=41).map(|i| i as f64 - 0.5).collect()
}

/// Direction sectoring for the per-sector functions.
#[derive(Clone, Debug)]
pub struct SectorBinning {
    /// Sector count for the zero-centred layout
    pub sectors: usize,
    /// Custom edges, overriding `sectors`
    pub bin_edges: Option<Vec<f64>>,
    /// Custom labels, one per sector
    pub labels: Option<Vec<String>>,
}

impl Default for SectorBinning {
    fn default() -> Self {
        Self {
            sectors: 12,
            bin_edges: None,
            labels: None,
        }
    }
}

impl SectorBinning {
    /// Zero-centred binning with `sectors` sectors.
    pub fn new(sectors: usize) -> Self {
        Self {
            sectors,
            ..Self::default()
        }
    }

    /// Use explicit bin edges.
    pub fn with_bin_edges(mut self, edges: Vec<f64>) -> Self {
        self.bin_edges = Some(edges);
        self
    }

    /// Use explicit sector labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    fn resolve(&self) -> Result<(DirectionBins, Vec<String>), CorrelError> {
        let bins = DirectionBins::from_options(self.sectors, self.bin_edges.as_deref())?;
        let labels = match &self.labels {
            Some(labels) if labels.len() != bins.sectors() => {
                return Err(CorrelError::dimension_mismatch(
                    format!("{} sector labels", bins.sectors()),
                    format!("{} labels", labels.len()),
                ));
            }
            Some(labels) => labels.clone(),
            None => bins.labels(),
        };
        Ok((bins, labels))
    }
}

/// Index of the right-open bin holding `value`.
fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    if value.is_nan() {
        return None;
    }
    let i = edges.partition_point(|&e| e <= value);
    (i > 0 && i < edges.len()).then(|| i - 1)
}

fn check_edges(edges: &[f64]) -> Result<(), CorrelError> {
    if edges.len() < 2 || edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CorrelError::InvalidConfig(
            "bins need at least two strictly increasing edges".into(),
        ));
    }
    Ok(())
}

fn interval_labels(edges: &[f64], labels: Option<&[String]>) -> Result<Vec<String>, CorrelError> {
    match labels {
        Some(labels) if labels.len() != edges.len() - 1 => Err(CorrelError::dimension_mismatch(
            format!("{} bin labels", edges.len() - 1),
            format!("{} labels", labels.len()),
        )),
        Some(labels) => Ok(labels.to_vec()),
        None => Ok(edges.windows(2).map(|w| format!("[{}, {})", w[0], w[1])).collect()),
    }
}

fn summarise(groups: &[Vec<f64>], total: usize, stat: &DistributionStat) -> Vec<(usize, f64)> {
    groups
        .iter()
        .map(|g| {
            let value = match stat {
                DistributionStat::PercentFrequency if total > 0 => g.len() as f64 / total as f64 * 100.0,
                DistributionStat::PercentFrequency => 0.0,
                DistributionStat::Aggregate(method) => method.apply(g),
            };
            (g.len(), value)
        })
        .collect()
}

/// Distribution of `var_series` over bins of `var_to_bin`.
///
/// Pass the same series twice for a plain histogram; pass speed and
/// temperature with [`DistributionStat::Aggregate`] for e.g. the mean speed per
/// temperature bin.
///
/// # Errors
/// - `InvalidConfig` for malformed bin edges
/// - `DimensionMismatch` when labels do not match the bins
pub fn get_distribution(
    var_series: &TimeSeries,
    var_to_bin: &TimeSeries,
    bins: &[f64],
    labels: Option<&[String]>,
    stat: &DistributionStat,
) -> Result<Vec<DistributionBin>, CorrelError> {
    check_edges(bins)?;
    let labels = interval_labels(bins, labels)?;

    let aligned = align(&[var_series, var_to_bin]);
    let mut groups = vec![Vec::new(); bins.len() - 1];
    for (&value, &key) in aligned.columns[0].iter().zip(aligned.columns[1].iter()) {
        if let Some(i) = bin_index(key, bins) {
            groups[i].push(value);
        }
    }

    Ok(summarise(&groups, aligned.len(), stat)
        .into_iter()
        .zip(labels)
        .enumerate()
        .map(|(i, ((count, value), label))| DistributionBin {
            label,
            lower: bins[i],
            upper: bins[i + 1],
            count,
            value,
        })
        .collect())
}

/// Distribution of a variable across direction sectors.
///
/// # Errors
/// Returns `DirectionOutOfRange` for directions outside the bin edges.
pub fn get_distribution_by_wind_sector(
    var_series: &TimeSeries,
    direction: &TimeSeries,
    binning: &SectorBinning,
    stat: &DistributionStat,
) -> Result<Vec<DistributionBin>, CorrelError> {
    let (bins, labels) = binning.resolve()?;

    let aligned = align(&[var_series, direction]);
    let mut groups = vec![Vec::new(); bins.sectors()];
    for (&value, &dir) in aligned.columns[0].iter().zip(aligned.columns[1].iter()) {
        groups[bins.assign(dir)? - 1].push(value);
    }

    Ok(sector_rows(&bins, labels, summarise(&groups, aligned.len(), stat)))
}

fn sector_rows(bins: &DirectionBins, labels: Vec<String>, stats: Vec<(usize, f64)>) -> Vec<DistributionBin> {
    let edges = bins.edges();
    stats
        .into_iter()
        .zip(labels)
        .enumerate()
        .map(|(i, ((count, value), label))| {
            let (lower, upper) = if i == 0 && bins.is_zero_centered() {
                (edges[edges.len() - 2], edges[1])
            } else {
                (edges[i], edges[i + 1])
            };
            DistributionBin {
                label,
                lower,
                upper,
                count,
                value,
            }
        })
        .collect()
}

/// Mean ratio `speed_2 / speed_1` per direction sector.
///
/// Only rows where both speeds exceed 3 m/s are used. Directions are taken
/// modulo 360 here.
pub fn get_sector_ratio(
    speed_1: &TimeSeries,
    speed_2: &TimeSeries,
    direction: &TimeSeries,
    binning: &SectorBinning,
) -> Result<Vec<DistributionBin>, CorrelError> {
    const MIN_SPEED: f64 = 3.0;

    let (bins, labels) = binning.resolve()?;
    let aligned = align(&[speed_1, speed_2, direction]);
    let mut groups = vec![Vec::new(); bins.sectors()];
    let mut total = 0;
    for i in 0..aligned.len() {
        let (s1, s2) = (aligned.columns[0][i], aligned.columns[1][i]);
        if s1 > MIN_SPEED && s2 > MIN_SPEED {
            let sector = bins.assign(aligned.columns[2][i].rem_euclid(360.0))?;
            groups[sector - 1].push(s2 / s1);
            total += 1;
        }
    }

    tracing::debug!("sector ratio from {} rows above {} m/s", total, MIN_SPEED);

    let stats = groups.iter().map(|g| (g.len(), mean(g))).collect();
    Ok(sector_rows(&bins, labels, stats))
}

/// Joint frequency of value bins (rows) and direction sectors (columns).
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
    /// Value bin labels
    pub row_labels: Vec<String>,
    /// Sector labels
    pub column_labels: Vec<String>,
    /// `values[row][column]`, as percent or raw counts
    pub values: Vec<Vec<f64>>,
}

impl FrequencyTable {
    /// Sum over all cells.
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Per-sector totals.
    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.column_labels.len())
            .map(|c| self.values.iter().map(|row| row[c]).sum())
            .collect()
    }
}

/// Frequency table of a variable by direction sector.
///
/// Rows outside the value bins are ignored; percentages are relative to the
/// rows that fall in some bin.
pub fn get_freq_table(
    var_series: &TimeSeries,
    direction: &TimeSeries,
    var_bins: &[f64],
    var_labels: Option<&[String]>,
    binning: &SectorBinning,
    as_percentage: bool,
) -> Result<FrequencyTable, CorrelError> {
    check_edges(var_bins)?;
    let row_labels = interval_labels(var_bins, var_labels)?;
    let (bins, column_labels) = binning.resolve()?;

    let aligned = align(&[var_series, direction]);
    let mut counts = vec![vec![0.0; bins.sectors()]; var_bins.len() - 1];
    let mut total = 0usize;
    for (&value, &dir) in aligned.columns[0].iter().zip(aligned.columns[1].iter()) {
        let Some(row) = bin_index(value, var_bins) else {
            continue;
        };
        counts[row][bins.assign(dir)? - 1] += 1.0;
        total += 1;
    }

    if as_percentage && total > 0 {
        let scale = 100.0 / total as f64;
        counts.iter_mut().flatten().for_each(|c| *c *= scale);
    }

    Ok(FrequencyTable {
        row_labels,
        column_labels,
        values: counts,
    })
}
