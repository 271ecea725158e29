//! Integration tests for long-term reference speeds, continuity and coverage.

use approx::assert_relative_eq;
use chrono::{NaiveDate, TimeDelta};
use correl_rs::analysis::get_concurrent_coverage;
use correl_rs::{
    AggregationMethod, AveragingPeriod, CorrelError, TimeSeries, TimeSeriesPoint, Timestamp,
    calc_lt_ref_speed, get_coverage, get_time_continuity_gaps, mean_of_monthly_means,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn hourly_constant(start: Timestamp, hours: usize, value: f64) -> Vec<TimeSeriesPoint> {
    (0..hours)
        .map(|i| TimeSeriesPoint::new(start + TimeDelta::hours(i as i64), value))
        .collect()
}

#[test]
fn test_momm_weighs_months_equally() {
    // Two full Januaries at 10 m/s against ten days of July at 4 m/s
    let mut points = hourly_constant(at(2020, 1, 1, 0), 31 * 24, 10.0);
    points.extend(hourly_constant(at(2020, 7, 1, 0), 10 * 24, 4.0));
    points.extend(hourly_constant(at(2021, 1, 1, 0), 31 * 24, 10.0));
    let series = TimeSeries::from_points(points).unwrap();

    assert_relative_eq!(mean_of_monthly_means(&series).unwrap(), 7.0, epsilon = 1e-12);
    assert!(series.mean() > 9.0, "plain mean is biased towards January");
}

#[test]
fn test_lt_ref_speed_date_bounds() {
    let series = TimeSeries::regular(
        at(2020, 1, 1, 0),
        TimeDelta::days(1),
        &(0..91).map(|d| if d < 31 { 1.0 } else if d < 60 { 2.0 } else { 3.0 }).collect::<Vec<_>>(),
    )
    .unwrap();

    let feb = calc_lt_ref_speed(&series, Some("2020-02-01".into()), Some("2020-02-29".into())).unwrap();
    assert_eq!(feb, 2.0);

    let from_march = calc_lt_ref_speed(&series, Some("2020-03-01T00:00:00".into()), None).unwrap();
    assert_eq!(from_march, 3.0);

    assert!((calc_lt_ref_speed(&series, None, None).unwrap() - 2.0).abs() < 1e-12);
    assert!(matches!(
        calc_lt_ref_speed(&series, Some("01/02/2020".into()), None),
        Err(CorrelError::Parse(_))
    ));
    assert!(matches!(
        calc_lt_ref_speed(&series, Some("2021-01-01".into()), None),
        Err(CorrelError::InsufficientData(_))
    ));
}

#[test]
fn test_missing_day_is_one_gap() {
    let mut points = hourly_constant(at(2020, 5, 1, 0), 48, 5.0);
    points.extend(hourly_constant(at(2020, 5, 4, 0), 48, 5.0));
    let series = TimeSeries::from_points(points).unwrap();

    let gaps = get_time_continuity_gaps(&series).unwrap();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].date_from, at(2020, 5, 2, 23));
    assert_eq!(gaps[0].date_to, at(2020, 5, 4, 0));
    assert_relative_eq!(gaps[0].days_lost, 25.0 / 24.0, epsilon = 1e-12);
}

#[test]
fn test_daily_coverage() {
    // Day one complete, day two missing its last twelve hours
    let values: Vec<f64> = (0..48).map(|h| if h >= 36 { f64::NAN } else { 6.0 }).collect();
    let series = TimeSeries::regular(at(2020, 5, 1, 0), TimeDelta::hours(1), &values).unwrap();

    let rows = get_coverage(&series, AveragingPeriod::daily(), &AggregationMethod::Mean).unwrap();
    assert_eq!(rows.len(), 2);
    assert!((rows[0].coverage - 1.0).abs() < 1e-12);
    assert_relative_eq!(rows[1].coverage, 0.5, epsilon = 1e-12);
    assert_eq!(rows[1].value, 6.0);
}

#[test]
fn test_concurrent_coverage_reports_both_sides() {
    let reference = TimeSeries::regular(at(2020, 5, 1, 0), TimeDelta::hours(1), &[4.0; 48]).unwrap();
    let target_values: Vec<f64> = (0..48).map(|h| if h % 4 == 0 { f64::NAN } else { 5.0 }).collect();
    let target = TimeSeries::regular(at(2020, 5, 1, 0), TimeDelta::hours(1), &target_values).unwrap();

    let rows = get_concurrent_coverage(
        &reference,
        &target,
        AveragingPeriod::daily(),
        AggregationMethod::Mean,
        AggregationMethod::Mean,
    )
    .unwrap();
    assert_eq!(rows.len(), 2);
    assert!((rows[0].ref_coverage - 1.0).abs() < 1e-12);
    assert!((rows[0].target_coverage - 0.75).abs() < 1e-12);
}
