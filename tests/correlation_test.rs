//! Integration tests for the correlation models.
//!
//! Covers the fit/synthesize lifecycle on averaged data, error paths before
//! fitting, and the multiple-regression edge cases.

use chrono::{NaiveDate, TimeDelta};
use correl_rs::{
    CorrelError, CorrelationConfig, CorrelationModel, MultipleLinearRegression, OrdinaryLeastSquares,
    OrthogonalLeastSquares, PlotOutcome, RecordingPlotter, SimpleSpeedRatio, SpeedPredictor, TimeSeries,
    Timestamp,
};

const TOL: f64 = 1e-9;

fn start() -> Timestamp {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn ten_minute(values: &[f64]) -> TimeSeries {
    TimeSeries::regular(start(), TimeDelta::minutes(10), values).unwrap()
}

/// Sixty days of 10-minute reference speeds with day-to-day variation.
fn reference_speeds() -> Vec<f64> {
    (0..60 * 144)
        .map(|i| 6.0 + 2.0 * (i as f64 * 0.003).sin() + (i % 7) as f64 * 0.1)
        .collect()
}

#[test]
fn test_ols_recovers_line_on_daily_means() {
    let x = reference_speeds();
    let y: Vec<f64> = x.iter().map(|v| 1.3 * v + 0.4).collect();
    let mut ols = OrdinaryLeastSquares::new(&ten_minute(&x), &ten_minute(&y), CorrelationConfig::daily()).unwrap();

    assert_eq!(ols.num_data_pts(), 60);
    ols.run().unwrap();

    let p = ols.params().unwrap();
    assert!((p.slope - 1.3).abs() < TOL, "slope {}", p.slope);
    assert!((p.offset - 0.4).abs() < 1e-8, "offset {}", p.offset);
    assert_eq!(ols.get_r2().unwrap(), p.r2);
    assert!(ols.get_error_metrics().unwrap().rmse < 1e-8);

    // Default synthesis runs over the daily-averaged reference record
    let synthesized = ols.synthesize(None).unwrap();
    let averaged = ols.base().averaged_reference();
    assert_eq!(synthesized.len(), averaged.len());
    for (s, a) in synthesized.iter().zip(averaged.iter()) {
        assert!((s.value - (1.3 * a.value + 0.4)).abs() < 1e-8);
    }
}

#[test]
fn test_models_agree_on_noise_free_data() {
    let x = reference_speeds();
    let y: Vec<f64> = x.iter().map(|v| 0.9 * v + 1.0).collect();
    let (rs, ts) = (ten_minute(&x), ten_minute(&y));

    let mut odr = OrthogonalLeastSquares::new(&rs, &ts, CorrelationConfig::daily()).unwrap();
    odr.run().unwrap();
    assert!((odr.params().unwrap().slope - 0.9).abs() < 1e-8);

    let mut ols = OrdinaryLeastSquares::new(&rs, &ts, CorrelationConfig::daily()).unwrap();
    ols.run().unwrap();
    let a = odr.predict(&[4.0, 8.0]).unwrap();
    let b = ols.predict(&[4.0, 8.0]).unwrap();
    assert!((a[0] - b[0]).abs() < 1e-7 && (a[1] - b[1]).abs() < 1e-7);
}

#[test]
fn test_unfit_model_errors() {
    let x = reference_speeds();
    let ols = OrdinaryLeastSquares::new(&ten_minute(&x), &ten_minute(&x), CorrelationConfig::daily()).unwrap();

    assert!(!ols.is_fitted());
    assert!(matches!(ols.synthesize(None), Err(CorrelError::UnfitModel { .. })));
    assert!(matches!(ols.show_params(), Err(CorrelError::UnfitModel { .. })));
    assert!(matches!(ols.get_r2(), Err(CorrelError::UnfitModel { .. })));
    assert_eq!(ols.base().get_error_metrics(), 0.0);
}

#[test]
fn test_speed_ratio_preserves_mean() {
    let x = reference_speeds();
    let y: Vec<f64> = x.iter().map(|v| 1.15 * v).collect();
    let mut ssr = SimpleSpeedRatio::new(&ten_minute(&x), &ten_minute(&y), CorrelationConfig::daily()).unwrap();
    ssr.run().unwrap();

    assert!((ssr.params().unwrap().ratio - 1.15).abs() < TOL);
    let synthesized = ssr.synthesize(None).unwrap();
    assert!((synthesized.mean() - 1.15 * ssr.base().averaged_reference().mean()).abs() < 1e-8);
}

#[test]
fn test_low_coverage_leaves_no_data() {
    // First six hours of every day missing: daily coverage 0.75 < 0.9
    let x: Vec<f64> = reference_speeds()
        .iter()
        .enumerate()
        .map(|(i, &v)| if i % 144 < 36 { f64::NAN } else { v })
        .collect();
    let result = OrdinaryLeastSquares::new(&ten_minute(&x), &ten_minute(&x), CorrelationConfig::daily());
    assert!(matches!(result, Err(CorrelError::InsufficientData(_))));
}

#[test]
fn test_mlr_two_predictors() {
    let n = 600;
    let x1: Vec<f64> = (0..n).map(|i| 5.0 + (i % 11) as f64).collect();
    let x2: Vec<f64> = (0..n).map(|i| 3.0 + ((i * 7) % 13) as f64 * 0.5).collect();
    let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 0.5 * a + 0.8 * b + 1.0).collect();
    let (s1, s2, t) = (ten_minute(&x1), ten_minute(&x2), ten_minute(&y));

    let mut mlr = MultipleLinearRegression::new(&[&s1, &s2], &t, CorrelationConfig::ten_minute()).unwrap();
    mlr.run().unwrap();

    let p = mlr.params().unwrap();
    assert!((p.slopes[0] - 0.5).abs() < 1e-8);
    assert!((p.slopes[1] - 0.8).abs() < 1e-8);
    assert!((p.offset - 1.0).abs() < 1e-7);
    assert!((p.r2 - 1.0).abs() < 1e-9);

    let mut plotter = RecordingPlotter::default();
    assert_eq!(
        mlr.plot(&mut plotter).unwrap(),
        PlotOutcome::Unsupported("Cannot plot Multiple Linear Regression".to_string())
    );
    assert!(plotter.requests.is_empty());

    assert!(matches!(
        mlr.synthesize(Some(&[&s1])),
        Err(CorrelError::DimensionMismatch { .. })
    ));
    let synthesized = mlr.synthesize(Some(&[&s1, &s2])).unwrap();
    assert!((synthesized.values()[3] - y[3]).abs() < 1e-7);
}

#[test]
fn test_mlr_rejects_empty_predictors() {
    let t = ten_minute(&[1.0, 2.0, 3.0]);
    assert!(matches!(
        MultipleLinearRegression::new(&[], &t, CorrelationConfig::ten_minute()),
        Err(CorrelError::InvalidInput(_))
    ));
}

#[test]
fn test_fit_is_deterministic() {
    let x = reference_speeds();
    let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 1.1 * v + (i % 5) as f64 * 0.05).collect();
    let (rs, ts) = (ten_minute(&x), ten_minute(&y));

    let mut a = OrdinaryLeastSquares::new(&rs, &ts, CorrelationConfig::hourly()).unwrap();
    let mut b = OrdinaryLeastSquares::new(&rs, &ts, CorrelationConfig::hourly()).unwrap();
    a.run().unwrap();
    b.run().unwrap();
    assert_eq!(a.params(), b.params());

    // Refitting the same model changes nothing
    let first = *a.params().unwrap();
    a.run().unwrap();
    assert_eq!(a.params(), Some(&first));
}
