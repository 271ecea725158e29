//! Integration tests for SpeedSort.
//!
//! Synthetic sites with a known speed-up and veer per sector, checking the
//! zero-speed rule, unmodelled sectors and repeatability of synthesis.

use approx::assert_relative_eq;
use chrono::{NaiveDate, TimeDelta};
use correl_rs::{
    CorrelError, CorrelationConfig, CorrelationModel, SpeedSort, SpeedSortConfig, TimeSeries, Timestamp,
    normalize_direction,
};

/// Route sector warnings to the test output; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start() -> Timestamp {
    NaiveDate::from_ymd_opt(2019, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn ten_minute(values: &[f64]) -> TimeSeries {
    TimeSeries::regular(start(), TimeDelta::minutes(10), values).unwrap()
}

struct Site {
    ref_spd: TimeSeries,
    target_spd: TimeSeries,
    ref_dir: TimeSeries,
    target_dir: TimeSeries,
}

/// Directions cycle through `centres`; sector `k` speeds up the target by
/// `1 + 0.05·k` and veers it by 8°.
fn site(n: usize, centres: &[f64]) -> Site {
    let mut rs = Vec::with_capacity(n);
    let mut ts = Vec::with_capacity(n);
    let mut rd = Vec::with_capacity(n);
    let mut td = Vec::with_capacity(n);
    for i in 0..n {
        let k = i % centres.len();
        let speed = 2.0 + ((i / centres.len()) % 17) as f64 * 0.7;
        rs.push(speed);
        ts.push(speed * (1.0 + 0.05 * k as f64));
        rd.push(centres[k]);
        td.push(normalize_direction(centres[k] + 8.0));
    }
    Site {
        ref_spd: ten_minute(&rs),
        target_spd: ten_minute(&ts),
        ref_dir: ten_minute(&rd),
        target_dir: ten_minute(&td),
    }
}

fn fitted(site: &Site, config: SpeedSortConfig) -> SpeedSort {
    init_tracing();
    let mut ss = SpeedSort::new(
        &site.ref_spd,
        &site.target_spd,
        &site.ref_dir,
        &site.target_dir,
        CorrelationConfig::ten_minute(),
        config,
    )
    .unwrap();
    ss.run().unwrap();
    ss
}

fn twelve_centres() -> Vec<f64> {
    (0..12).map(|k| k as f64 * 30.0).collect()
}

#[test]
fn test_every_sector_fitted_with_veer() {
    let ss = fitted(&site(12 * 170, &twelve_centres()), SpeedSortConfig::default());
    let params = ss.params().unwrap();

    assert_eq!(params.fitted_sectors().count(), 12);
    assert_relative_eq!(params.overall_average_veer, 8.0, epsilon = 1e-9);
    for (k, sector) in params.fitted_sectors().enumerate() {
        assert_eq!(sector.sector, k + 1);
        assert_relative_eq!(sector.speed_model.slope, 1.0 + 0.05 * k as f64, epsilon = 1e-9);
        assert_relative_eq!(sector.average_veer, 8.0, epsilon = 1e-9);
    }
}

#[test]
fn test_zero_reference_speed_gives_zero() {
    let ss = fitted(&site(12 * 170, &twelve_centres()), SpeedSortConfig::default());

    let speeds = ten_minute(&[0.0, 5.0, 0.0]);
    let dirs = ten_minute(&[30.0, 30.0, 300.0]);
    let out = ss.synthesize(Some(&speeds), Some(&dirs)).unwrap();
    assert_eq!(out.values()[0], 0.0);
    assert_eq!(out.values()[2], 0.0);
    assert!(out.values()[1] > 5.0);
}

#[test]
fn test_unmodelled_sector_synthesizes_nan() {
    // Only the north and south sectors ever see data
    let ss = fitted(&site(400, &[0.0, 180.0]), SpeedSortConfig::default().with_sectors(4));
    let params = ss.params().unwrap();
    assert!(params.sector(2).is_none());
    assert!(params.sector(4).is_none());

    let out = ss
        .synthesize(Some(&ten_minute(&[6.0, 6.0])), Some(&ten_minute(&[0.0, 90.0])))
        .unwrap();
    assert!(out.values()[0].is_finite());
    assert!(out.values()[1].is_nan());

    let table = ss.get_result_table().unwrap();
    assert_eq!(table.len(), 4);
    assert!(table[1].slope.is_nan());
    assert_eq!(table[1].num_total_pts, 0);
}

#[test]
fn test_custom_direction_bins() {
    let config = SpeedSortConfig::default().with_direction_bin_array(vec![0.0, 90.0, 180.0, 270.0, 360.0]);
    let ss = fitted(&site(4 * 170, &[45.0, 135.0, 225.0, 315.0]), config);

    assert_eq!(ss.direction_bins().sectors(), 4);
    assert_eq!(ss.params().unwrap().fitted_sectors().count(), 4);
    assert_eq!(ss.direction_bins().labels()[0], "0.0-90.0");
}

#[test]
fn test_synthesis_is_repeatable() {
    let s = site(12 * 170, &twelve_centres());
    let mut ss = fitted(&s, SpeedSortConfig::default());

    let first = ss.synthesize(None, None).unwrap();
    let second = ss.synthesize(None, None).unwrap();
    assert_eq!(first, second);

    // Refitting on the same rows gives the same parameters
    let before = ss.params().unwrap().clone();
    ss.run().unwrap();
    assert_eq!(ss.params().unwrap(), &before);
}

#[test]
fn test_direction_outside_bins_rejected() {
    let ss = fitted(&site(12 * 170, &twelve_centres()), SpeedSortConfig::default());
    let result = ss.predict(&[5.0], &[400.0]);
    assert!(matches!(result, Err(CorrelError::DirectionOutOfRange { .. })));
}

#[test]
fn test_lt_ref_speed_override_sets_cutoff() {
    let ss = fitted(
        &site(12 * 170, &twelve_centres()),
        SpeedSortConfig::default().with_lt_ref_speed(5.0),
    );
    assert_eq!(ss.lt_ref_speed(), 5.0);
    assert_relative_eq!(ss.cutoff(), 2.5);
}

#[test]
fn test_raw_ten_minute_data_without_preprocessing() {
    init_tracing();
    let centres = [0.0, 90.0, 180.0, 270.0];
    let speed = |i: usize| 2.0 + (i % 17) as f64 * 0.7;
    let factor = |i: usize| 1.0 + 0.1 * (i % 4) as f64;
    let dir = |i: usize| centres[i % 4];

    // Reference covers indices 0..400, target 50..450 with one missing reading
    let ref_spd: Vec<f64> = (0..400).map(speed).collect();
    let ref_dir: Vec<f64> = (0..400).map(dir).collect();
    let target_spd: Vec<f64> = (50..450)
        .map(|i| if i == 100 { f64::NAN } else { speed(i) * factor(i) })
        .collect();
    let target_dir: Vec<f64> = (50..450).map(|i| normalize_direction(dir(i) + 5.0)).collect();
    let target_start = start() + TimeDelta::minutes(500);
    let regular = |t0, values: &[f64]| TimeSeries::regular(t0, TimeDelta::minutes(10), values).unwrap();

    let mut ss = SpeedSort::new(
        &regular(start(), &ref_spd),
        &regular(target_start, &target_spd),
        &regular(start(), &ref_dir),
        &regular(target_start, &target_dir),
        CorrelationConfig::ten_minute().without_preprocessing(),
        SpeedSortConfig::default().with_sectors(4),
    )
    .unwrap();
    ss.run().unwrap();

    // Raw intersection: indices 50..400 minus the missing reading
    assert_eq!(ss.num_data_pts(), 349);

    let lt = ref_spd.iter().sum::<f64>() / ref_spd.len() as f64;
    let cutoff = (0.5 * lt).min(4.0);
    assert_relative_eq!(ss.cutoff(), cutoff, epsilon = 1e-12);

    let params = ss.params().unwrap();
    for k in 0..4 {
        let rows: Vec<usize> = (50..400).filter(|&i| i != 100 && i % 4 == k).collect();
        let mut x: Vec<f64> = rows.iter().map(|&i| speed(i)).collect();
        let mut y: Vec<f64> = rows.iter().map(|&i| speed(i) * factor(i)).collect();
        x.sort_by(f64::total_cmp);
        y.sort_by(f64::total_cmp);
        let first_kept = x.iter().position(|&v| v >= cutoff).unwrap_or(0);

        let sector = params.sector(k + 1).unwrap();
        assert_eq!(sector.num_total_pts, rows.len());
        assert_eq!(sector.num_pts_for_speed_fit(), rows.len() - first_kept);
        assert_eq!(sector.speed_model.target_cutoff, y[first_kept], "sector {}", k + 1);
    }

    let out = ss
        .synthesize(Some(&regular(start(), &[0.0, 0.0, 6.0])), Some(&regular(start(), &[90.0, 270.0, 90.0])))
        .unwrap();
    assert_eq!(out.values()[0], 0.0);
    assert_eq!(out.values()[1], 0.0);
    assert!(out.values()[2] > 6.0);
}

#[test]
fn test_new_rejects_invalid_config() {
    let s = site(200, &[0.0, 180.0]);
    let result = SpeedSort::new(
        &s.ref_spd,
        &s.target_spd,
        &s.ref_dir,
        &s.target_dir,
        CorrelationConfig::ten_minute(),
        SpeedSortConfig::default().with_lt_ref_speed(-1.0),
    );
    assert!(matches!(result, Err(CorrelError::InvalidConfig(_))));
}
