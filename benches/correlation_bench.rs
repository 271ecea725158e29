//! Benchmarks for preprocessing and fitting the linear models.
//!
//! Run with: `cargo bench --bench correlation_bench`
//!
//! Compares the cost of monthly/daily/hourly averaging and the fit itself on
//! a year of 10-minute data.

use chrono::{NaiveDate, TimeDelta};
use correl_rs::{
    CorrelationConfig, CorrelationModel, MultipleLinearRegression, OrdinaryLeastSquares, OrthogonalLeastSquares,
    TimeSeries,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// One year of 10-minute readings with diurnal and synoptic variation.
fn generate_series(n: usize, scale: f64, phase: f64) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            scale * (7.0 + 2.0 * (t * 2.0 * std::f64::consts::PI / 144.0 + phase).sin() + 1.5 * (t * 0.0007).cos())
        })
        .collect();
    TimeSeries::regular(start, TimeDelta::minutes(10), &values).unwrap()
}

/// Construction (averaging plus alignment) at several periods.
fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let reference = generate_series(52_560, 1.0, 0.0);
    let target = generate_series(52_560, 1.2, 0.3);

    for (name, config) in [
        ("monthly", CorrelationConfig::monthly()),
        ("daily", CorrelationConfig::daily()),
        ("hourly", CorrelationConfig::hourly()),
    ] {
        group.bench_with_input(BenchmarkId::new("ols_new", name), &config, |b, config| {
            b.iter(|| OrdinaryLeastSquares::new(black_box(&reference), black_box(&target), config.clone()).unwrap())
        });
    }
    group.finish();
}

/// Fit only, on hourly concurrent data.
fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    let reference = generate_series(52_560, 1.0, 0.0);
    let second = generate_series(52_560, 0.8, 1.1);
    let target = generate_series(52_560, 1.2, 0.3);

    let ols = OrdinaryLeastSquares::new(&reference, &target, CorrelationConfig::hourly()).unwrap();
    group.bench_function("ols", |b| {
        b.iter(|| {
            let mut model = ols.clone();
            model.run().unwrap();
            black_box(model.params().copied())
        })
    });

    let odr = OrthogonalLeastSquares::new(&reference, &target, CorrelationConfig::hourly()).unwrap();
    group.bench_function("orthogonal", |b| {
        b.iter(|| {
            let mut model = odr.clone();
            model.run().unwrap();
            black_box(model.params().copied())
        })
    });

    let mlr = MultipleLinearRegression::new(&[&reference, &second], &target, CorrelationConfig::hourly()).unwrap();
    group.bench_function("mlr_2", |b| {
        b.iter(|| {
            let mut model = mlr.clone();
            model.run().unwrap();
            black_box(model.params().cloned())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_fit);
criterion_main!(benches);
