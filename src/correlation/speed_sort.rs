//! SpeedSort: direction-sectored correlation with veer modelling.
//!
//! Concurrent rows are grouped by reference direction sector. Each sector
//! gets its own [`SectorSpeedModel`] and an average veer (target minus
//! reference direction), so synthesis dispatches every `(speed, direction)`
//! point to the model of its sector.
//!
//! Before grouping, the rows are conditioned:
//!
//! 1. Calm rows (< 1 m/s) have unreliable vanes; their directions are spread
//!    evenly around the compass so calms do not pile into one sector.
//! 2. The overall veer is the mean wrapped veer of rows above both veer
//!    cutoffs, `0.5 · (6 + 0.5 · MOMM(speed))`.
//! 3. Rows with a near-calm reference but a clearly windy target take their
//!    reference direction from the target direction minus the overall veer.
//!
//! Rows are fitted by reference sector. The target sector of each row is kept
//! too, so every fitted sector reports how its rows spread over target sectors.

use std::fmt;

use crate::analysis::mean_of_monthly_means;
use crate::direction::{DirectionBins, direction_veer, normalize_direction};
use crate::error::CorrelError;
use crate::plot::{PlotOutcome, PlotRequest, Plotter, ScatterPlot, WindVanePlot};
use crate::series::{TimeSeries, TimeSeriesPoint, align, mean};
use crate::transform::ConcurrentInputs;

use super::{
    CorrelationBase, CorrelationConfig, CorrelationModel, SectorSpeedModel, SpeedSortConfig, speed_cutoff,
};

/// Speeds below this are calm.
const CALM_SPEED: f64 = 1.0;

/// Reference speeds below this are checked against the target.
const LOW_REF_SPEED: f64 = 2.0;

/// Target excess over a low reference speed that triggers direction correction.
const LOW_REF_TARGET_EXCESS: f64 = 4.0;

/// Fractional part of the golden ratio; successive multiples fill [0, 1) evenly.
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_894_9;

/// Fitted state of one direction sector.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorParams {
    /// 1-based sector id
    pub sector: usize,
    /// Sector label
    pub label: String,
    /// Sorted-speed line of the sector
    pub speed_model: SectorSpeedModel,
    /// Rows in the sector
    pub num_total_pts: usize,
    /// Mean veer of the sector's rows above both veer cutoffs, in degrees
    pub average_veer: f64,
    /// Rows used for the veer
    pub num_pts_for_veer: usize,
    /// Fewer speed-fit points than the configured minimum
    pub low_confidence: bool,
    /// Rows of this reference sector per target-direction sector
    pub target_sector_counts: Vec<usize>,
}

impl SectorParams {
    /// Points used for the speed fit.
    pub fn num_pts_for_speed_fit(&self) -> usize {
        self.speed_model.data_pts
    }
}

/// Fitted SpeedSort parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedSortParams {
    /// Long-term reference speed behind the cutoff
    pub lt_ref_speed: f64,
    /// Reference speed below which sector lines are not used
    pub ref_cutoff_for_speed: f64,
    /// Reference speed above which rows count towards veer
    pub ref_veer_cutoff: f64,
    /// Target speed above which rows count towards veer
    pub target_veer_cutoff: f64,
    /// Mean veer over all sectors
    pub overall_average_veer: f64,
    /// Indexed by sector id - 1; `None` where no model could be fitted
    pub sectors: Vec<Option<SectorParams>>,
}

impl SpeedSortParams {
    /// Parameters of a 1-based sector.
    pub fn sector(&self, id: usize) -> Option<&SectorParams> {
        self.sectors.get(id.checked_sub(1)?)?.as_ref()
    }

    /// Sectors with a model.
    pub fn fitted_sectors(&self) -> impl Iterator<Item = &SectorParams> {
        self.sectors.iter().flatten()
    }
}

impl fmt::Display for SpeedSortParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Long-term ref speed        {:.4}", self.lt_ref_speed)?;
        writeln!(f, "Ref cutoff for speed       {:.4}", self.ref_cutoff_for_speed)?;
        writeln!(f, "Ref veer cutoff            {:.4}", self.ref_veer_cutoff)?;
        writeln!(f, "Target veer cutoff         {:.4}", self.target_veer_cutoff)?;
        writeln!(f, "Overall average veer       {:.4}", self.overall_average_veer)?;
        write!(
            f,
            "{:>6} {:>12} {:>9} {:>9} {:>10} {:>9} {:>9} {:>8} {:>8}",
            "Sector", "Label", "Slope", "Offset", "TgtCutoff", "SpeedPts", "TotalPts", "Veer", "VeerPts"
        )?;
        for (i, sector) in self.sectors.iter().enumerate() {
            match sector {
                Some(s) => write!(
                    f,
                    "\n{:>6} {:>12} {:>9.4} {:>9.4} {:>10.4} {:>9} {:>9} {:>8.2} {:>8}{}",
                    s.sector,
                    s.label,
                    s.speed_model.slope,
                    s.speed_model.offset,
                    s.speed_model.target_cutoff,
                    s.num_pts_for_speed_fit(),
                    s.num_total_pts,
                    s.average_veer,
                    s.num_pts_for_veer,
                    if s.low_confidence { " (low confidence)" } else { "" }
                )?,
                None => write!(f, "\n{:>6} {:>12} {:>9}", i + 1, "", "no model")?,
            }
        }
        Ok(())
    }
}

/// One row of [`SpeedSort::get_result_table`]; `NaN` fields for unfitted sectors.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorResult {
    /// 1-based sector id
    pub sector: usize,
    /// Sector label
    pub label: String,
    /// Line slope
    pub slope: f64,
    /// Line offset
    pub offset: f64,
    /// Reference cutoff speed
    pub cutoff: f64,
    /// Target speed at the cutoff
    pub target_cutoff: f64,
    /// Points used for the speed fit
    pub num_pts_for_speed_fit: usize,
    /// Rows in the sector
    pub num_total_pts: usize,
    /// Average veer in degrees
    pub average_veer: f64,
    /// Low sample count flag
    pub low_confidence: bool,
}

/// Concurrent row after direction conditioning.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SectorRow {
    ref_spd: f64,
    target_spd: f64,
    ref_dir: f64,
    target_dir: f64,
    sector: usize,
    target_sector: usize,
}

/// Inputs shared by every sector fit.
#[derive(Clone, Copy, Debug)]
struct SectorFitContext {
    sectors: usize,
    cutoff: f64,
    ref_veer_cutoff: f64,
    target_veer_cutoff: f64,
    overall_veer: f64,
    min_sector_points: usize,
}

/// Sector-wise speed and veer model.
#[derive(Clone, Debug)]
pub struct SpeedSort {
    base: CorrelationBase,
    config: SpeedSortConfig,
    bins: DirectionBins,
    lt_ref_speed: f64,
    context: SectorFitContext,
    rows: Vec<SectorRow>,
    params: Option<SpeedSortParams>,
}

impl SpeedSort {
    /// Preprocess speeds and directions and build an unfit model.
    pub fn new(
        ref_spd: &TimeSeries,
        target_spd: &TimeSeries,
        ref_dir: &TimeSeries,
        target_dir: &TimeSeries,
        config: CorrelationConfig,
        speed_sort: SpeedSortConfig,
    ) -> Result<Self, CorrelError> {
        let inputs = ConcurrentInputs::speeds(ref_spd, target_spd).with_directions(ref_dir, target_dir);
        Self::from_base(CorrelationBase::new(inputs, config)?, speed_sort)
    }

    /// Unfit model over existing concurrent data, which must carry directions.
    ///
    /// # Errors
    /// - `InvalidInput` without directions
    /// - `DirectionOutOfRange` when a conditioned direction falls outside the bins
    pub fn from_base(base: CorrelationBase, speed_sort: SpeedSortConfig) -> Result<Self, CorrelError> {
        speed_sort.validate()?;
        if !base.data().has_directions() {
            return Err(CorrelError::InvalidInput(
                "SpeedSort needs reference and target directions".into(),
            ));
        }

        let bins = DirectionBins::from_options(speed_sort.sectors, speed_sort.direction_bin_array.as_deref())?;
        let lt_ref_speed = match speed_sort.lt_ref_speed {
            Some(lt) => lt,
            None => mean_of_monthly_means(base.ref_spd())?,
        };
        let ref_veer_cutoff = veer_cutoff(&base.data().ref_series())?;
        let target_veer_cutoff = veer_cutoff(&base.data().target_series())?;

        let mut rows: Vec<SectorRow> = base
            .data()
            .rows()
            .iter()
            .filter_map(|r| {
                Some(SectorRow {
                    ref_spd: r.ref_spd,
                    target_spd: r.target_spd,
                    ref_dir: r.ref_dir?,
                    target_dir: r.target_dir?,
                    sector: 0,
                    target_sector: 0,
                })
            })
            .collect();

        if speed_sort.spread_calm_directions {
            spread_calm_directions(&mut rows);
        }
        let overall_veer = mean_windy_veer(&rows, ref_veer_cutoff, target_veer_cutoff);
        correct_low_reference_directions(&mut rows, overall_veer);
        for row in &mut rows {
            row.sector = bins.assign(row.ref_dir)?;
            row.target_sector = bins.assign(row.target_dir)?;
        }

        let context = SectorFitContext {
            sectors: bins.sectors(),
            cutoff: speed_cutoff(lt_ref_speed),
            ref_veer_cutoff,
            target_veer_cutoff,
            overall_veer,
            min_sector_points: speed_sort.min_sector_points,
        };

        tracing::debug!(
            "SpeedSort: lt_ref_speed={:.3}, cutoff={:.3}, veer cutoffs={:.3}/{:.3}, overall veer={:.2}",
            lt_ref_speed,
            context.cutoff,
            ref_veer_cutoff,
            target_veer_cutoff,
            overall_veer
        );

        Ok(Self {
            base,
            config: speed_sort,
            bins,
            lt_ref_speed,
            context,
            rows,
            params: None,
        })
    }

    /// Shared inputs and concurrent data.
    pub fn base(&self) -> &CorrelationBase {
        &self.base
    }

    /// SpeedSort configuration.
    pub fn config(&self) -> &SpeedSortConfig {
        &self.config
    }

    /// Sector layout.
    pub fn direction_bins(&self) -> &DirectionBins {
        &self.bins
    }

    /// Long-term reference speed.
    pub fn lt_ref_speed(&self) -> f64 {
        self.lt_ref_speed
    }

    /// Reference cutoff speed.
    pub fn cutoff(&self) -> f64 {
        self.context.cutoff
    }

    /// Reference and target veer cutoffs.
    pub fn veer_cutoffs(&self) -> (f64, f64) {
        (self.context.ref_veer_cutoff, self.context.target_veer_cutoff)
    }

    /// Mean veer over all rows above both veer cutoffs.
    pub fn overall_veer(&self) -> f64 {
        self.context.overall_veer
    }

    /// Fitted parameters.
    pub fn params(&self) -> Option<&SpeedSortParams> {
        self.params.as_ref()
    }

    fn fitted(&self, operation: &'static str) -> Result<&SpeedSortParams, CorrelError> {
        self.params.as_ref().ok_or(CorrelError::UnfitModel { operation })
    }

    fn sector_groups(&self) -> Vec<Vec<SectorRow>> {
        let mut groups = vec![Vec::new(); self.bins.sectors()];
        for row in &self.rows {
            groups[row.sector - 1].push(*row);
        }
        groups
    }

    fn predict_point(params: &SpeedSortParams, bins: &DirectionBins, speed: f64, dir: f64) -> Result<f64, CorrelError> {
        if speed == 0.0 {
            return Ok(0.0);
        }
        let sector = bins.assign(dir)?;
        Ok(params.sector(sector).map_or(f64::NAN, |s| s.speed_model.predict(speed)))
    }

    /// Target speeds for paired reference speeds and directions.
    pub fn predict(&self, speeds: &[f64], directions: &[f64]) -> Result<Vec<f64>, CorrelError> {
        let params = self.fitted("predict")?;
        if speeds.len() != directions.len() {
            return Err(CorrelError::dimension_mismatch(
                format!("{} directions", speeds.len()),
                format!("{} directions", directions.len()),
            ));
        }
        speeds
            .iter()
            .zip(directions.iter())
            .map(|(&s, &d)| Self::predict_point(params, &self.bins, s, d))
            .collect()
    }

    /// Synthesize target speeds from reference speed and direction series.
    ///
    /// Inputs are joined on timestamps. `None` uses the full reference
    /// records averaged to the model's period. Points in a sector without a
    /// model come out as `NaN`.
    ///
    /// # Errors
    /// - `UnfitModel` before `run()`
    /// - `DirectionOutOfRange` for directions outside the bins
    pub fn synthesize(
        &self,
        input_spd: Option<&TimeSeries>,
        input_dir: Option<&TimeSeries>,
    ) -> Result<TimeSeries, CorrelError> {
        let params = self.fitted("synthesize")?;
        let spd = input_spd.unwrap_or_else(|| self.base.averaged_reference());
        let dir = self.reference_direction(input_dir)?;

        let aligned = align(&[spd, dir]);
        let mut unmodelled = 0usize;
        let mut points = Vec::with_capacity(aligned.len());
        for (i, &timestamp) in aligned.timestamps.iter().enumerate() {
            let value = Self::predict_point(params, &self.bins, aligned.columns[0][i], aligned.columns[1][i])?;
            if value.is_nan() {
                unmodelled += 1;
            }
            points.push(TimeSeriesPoint::new(timestamp, value));
        }

        if unmodelled > 0 {
            tracing::warn!(
                "{} of {} synthesized points fall in sectors without a model",
                unmodelled,
                aligned.len()
            );
        }
        Ok(TimeSeries::from_sorted_points(points))
    }

    /// Synthesize target directions: reference direction plus sector veer.
    pub fn synthesize_direction(&self, input_dir: Option<&TimeSeries>) -> Result<TimeSeries, CorrelError> {
        let params = self.fitted("synthesize_direction")?;
        let dir = self.reference_direction(input_dir)?;

        let points = dir
            .iter()
            .filter(|p| !p.is_missing())
            .map(|p| {
                let sector = self.bins.assign(p.value)?;
                let value = params
                    .sector(sector)
                    .map_or(f64::NAN, |s| normalize_direction(p.value + s.average_veer));
                Ok(TimeSeriesPoint::new(p.timestamp, value))
            })
            .collect::<Result<Vec<_>, CorrelError>>()?;
        Ok(TimeSeries::from_sorted_points(points))
    }

    fn reference_direction<'a>(&'a self, input: Option<&'a TimeSeries>) -> Result<&'a TimeSeries, CorrelError> {
        match input {
            Some(d) => Ok(d),
            None => self
                .base
                .averaged_reference_direction()
                .ok_or_else(|| CorrelError::InvalidInput("no reference direction to synthesize from".into())),
        }
    }

    /// Per-sector diagnostic table, one row for every sector.
    pub fn get_result_table(&self) -> Result<Vec<SectorResult>, CorrelError> {
        let params = self.fitted("get_result_table")?;
        let labels = self.bins.labels();
        let groups = self.sector_groups();

        Ok((1..=self.bins.sectors())
            .map(|id| {
                let total = groups[id - 1].len();
                match params.sector(id) {
                    Some(s) => SectorResult {
                        sector: id,
                        label: s.label.clone(),
                        slope: s.speed_model.slope,
                        offset: s.speed_model.offset,
                        cutoff: s.speed_model.cutoff,
                        target_cutoff: s.speed_model.target_cutoff,
                        num_pts_for_speed_fit: s.num_pts_for_speed_fit(),
                        num_total_pts: total,
                        average_veer: s.average_veer,
                        low_confidence: s.low_confidence,
                    },
                    None => SectorResult {
                        sector: id,
                        label: labels.get(id - 1).cloned().unwrap_or_default(),
                        slope: f64::NAN,
                        offset: f64::NAN,
                        cutoff: params.ref_cutoff_for_speed,
                        target_cutoff: f64::NAN,
                        num_pts_for_speed_fit: 0,
                        num_total_pts: total,
                        average_veer: f64::NAN,
                        low_confidence: true,
                    },
                }
            })
            .collect())
    }

    /// Hand the per-sector veer summary to `plotter`.
    pub fn plot_wind_vane(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError> {
        let params = self.fitted("plot_wind_vane")?;
        let labels = self.bins.labels();
        let vane = WindVanePlot {
            labels,
            average_veer: params
                .sectors
                .iter()
                .map(|s| s.as_ref().map_or(f64::NAN, |s| s.average_veer))
                .collect(),
            counts: params
                .sectors
                .iter()
                .map(|s| s.as_ref().map_or(0, |s| s.num_pts_for_veer))
                .collect(),
        };
        plotter.draw(PlotRequest::WindVane(vane))?;
        Ok(PlotOutcome::Rendered)
    }
}

/// `0.5 · (6 + 0.5 · MOMM(speed))`.
fn veer_cutoff(speed: &TimeSeries) -> Result<f64, CorrelError> {
    Ok(0.5 * (6.0 + 0.5 * mean_of_monthly_means(speed)?))
}

fn calm_direction(k: usize) -> f64 {
    ((k + 1) as f64 * GOLDEN_RATIO_CONJUGATE).fract() * 360.0
}

fn spread_calm_directions(rows: &mut [SectorRow]) {
    let (mut ref_calms, mut target_calms) = (0, 0);
    for row in rows.iter_mut() {
        if row.ref_spd < CALM_SPEED {
            row.ref_dir = calm_direction(ref_calms);
            ref_calms += 1;
        }
        if row.target_spd < CALM_SPEED {
            row.target_dir = calm_direction(target_calms);
            target_calms += 1;
        }
    }
    if ref_calms + target_calms > 0 {
        tracing::debug!(
            "spread directions of {} reference and {} target calms",
            ref_calms,
            target_calms
        );
    }
}

fn veer_of_windy_rows<'a>(
    rows: impl Iterator<Item = &'a SectorRow>,
    ref_veer_cutoff: f64,
    target_veer_cutoff: f64,
) -> Vec<f64> {
    rows.filter(|r| r.ref_spd >= ref_veer_cutoff && r.target_spd >= target_veer_cutoff)
        .map(|r| direction_veer(r.ref_dir, r.target_dir))
        .collect()
}

fn mean_windy_veer(rows: &[SectorRow], ref_veer_cutoff: f64, target_veer_cutoff: f64) -> f64 {
    let veers = veer_of_windy_rows(rows.iter(), ref_veer_cutoff, target_veer_cutoff);
    if veers.is_empty() {
        tracing::warn!(
            "no rows above the veer cutoffs ({:.2}, {:.2}); using zero overall veer",
            ref_veer_cutoff,
            target_veer_cutoff
        );
        return 0.0;
    }
    mean(&veers)
}

fn correct_low_reference_directions(rows: &mut [SectorRow], overall_veer: f64) {
    let mut corrected = 0;
    for row in rows.iter_mut() {
        if row.ref_spd < LOW_REF_SPEED && row.target_spd > row.ref_spd + LOW_REF_TARGET_EXCESS {
            row.ref_dir = normalize_direction(row.target_dir - overall_veer);
            corrected += 1;
        }
    }
    if corrected > 0 {
        tracing::debug!("took reference direction from target for {} low-speed rows", corrected);
    }
}

fn fit_sector(ctx: SectorFitContext, sector: usize, label: String, rows: &[SectorRow]) -> Option<SectorParams> {
    if rows.is_empty() {
        tracing::debug!("sector {} ({}) has no data", sector, label);
        return None;
    }

    let ref_spd: Vec<f64> = rows.iter().map(|r| r.ref_spd).collect();
    let target_spd: Vec<f64> = rows.iter().map(|r| r.target_spd).collect();
    let speed_model = match SectorSpeedModel::fit(&ref_spd, &target_spd, ctx.cutoff) {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!("sector {} ({}) has no speed model: {}", sector, label, e);
            return None;
        }
    };

    let veers = veer_of_windy_rows(rows.iter(), ctx.ref_veer_cutoff, ctx.target_veer_cutoff);
    let average_veer = if veers.is_empty() {
        ctx.overall_veer
    } else {
        mean(&veers)
    };

    let mut target_sector_counts = vec![0; ctx.sectors];
    for row in rows {
        target_sector_counts[row.target_sector - 1] += 1;
    }

    let low_confidence = speed_model.data_pts < ctx.min_sector_points;
    if low_confidence {
        tracing::warn!(
            "sector {} ({}) fitted on only {} points (minimum {})",
            sector,
            label,
            speed_model.data_pts,
            ctx.min_sector_points
        );
    }

    Some(SectorParams {
        sector,
        label,
        speed_model,
        num_total_pts: rows.len(),
        average_veer,
        num_pts_for_veer: veers.len(),
        low_confidence,
        target_sector_counts,
    })
}

#[cfg_attr(all(feature = "parallel", not(test)), allow(dead_code))]
fn fit_sectors(ctx: SectorFitContext, labels: Vec<String>, groups: &[Vec<SectorRow>]) -> Vec<Option<SectorParams>> {
    groups
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (rows, label))| fit_sector(ctx, i + 1, label, rows))
        .collect()
}

#[cfg(feature = "parallel")]
fn fit_sectors_parallel(
    ctx: SectorFitContext,
    labels: Vec<String>,
    groups: &[Vec<SectorRow>],
) -> Vec<Option<SectorParams>> {
    use rayon::prelude::*;

    groups
        .par_iter()
        .zip(labels.into_par_iter())
        .enumerate()
        .map(|(i, (rows, label))| fit_sector(ctx, i + 1, label, rows))
        .collect()
}

impl CorrelationModel for SpeedSort {
    fn name(&self) -> &'static str {
        "SpeedSort"
    }

    fn run(&mut self) -> Result<(), CorrelError> {
        let groups = self.sector_groups();
        let labels = self.bins.labels();

        #[cfg(feature = "parallel")]
        let sectors = fit_sectors_parallel(self.context, labels, &groups);
        #[cfg(not(feature = "parallel"))]
        let sectors = fit_sectors(self.context, labels, &groups);

        let n_fitted = sectors.iter().flatten().count();
        if n_fitted == 0 {
            return Err(CorrelError::fit("no direction sector has enough data for a speed model"));
        }
        tracing::debug!("SpeedSort fitted {} of {} sectors", n_fitted, sectors.len());

        self.params = Some(SpeedSortParams {
            lt_ref_speed: self.lt_ref_speed,
            ref_cutoff_for_speed: self.context.cutoff,
            ref_veer_cutoff: self.context.ref_veer_cutoff,
            target_veer_cutoff: self.context.target_veer_cutoff,
            overall_average_veer: self.context.overall_veer,
            sectors,
        });
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn num_data_pts(&self) -> usize {
        self.base.num_data_pts()
    }

    fn coverage_threshold(&self) -> f64 {
        self.base.coverage_threshold()
    }

    fn show_params(&self) -> Result<String, CorrelError> {
        Ok(self.fitted("show_params")?.to_string())
    }

    /// Rows whose sector has a model, using the conditioned reference directions.
    fn concurrent_predictions(&self) -> Result<(Vec<f64>, Vec<f64>), CorrelError> {
        let params = self.fitted("concurrent_predictions")?;
        let mut predicted = Vec::with_capacity(self.rows.len());
        let mut observed = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let Some(sector) = params.sector(row.sector) else {
                continue;
            };
            predicted.push(sector.speed_model.predict(row.ref_spd));
            observed.push(row.target_spd);
        }
        Ok((predicted, observed))
    }

    fn plot(&self, plotter: &mut dyn Plotter) -> Result<PlotOutcome, CorrelError> {
        let params = self.fitted("plot")?;
        for (sector, rows) in params.sectors.iter().zip(self.sector_groups()) {
            let Some(sector) = sector else {
                continue;
            };
            let model = sector.speed_model;
            let scatter = ScatterPlot::new(
                format!("Sector {} ({})", sector.sector, sector.label),
                rows.iter().map(|r| r.ref_spd).collect(),
                rows.iter().map(|r| r.target_spd).collect(),
            )
            .with_fit(50, |x| model.predict(x));
            plotter.draw(PlotRequest::Scatter(scatter))?;
        }
        Ok(PlotOutcome::Rendered)
    }
}
