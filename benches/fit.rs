//! Benchmarks for SARIMA fitting, forecasting and diagnostics.

use chrono::NaiveDate;
use cpi_forecast::core::TimeSeries;
use cpi_forecast::diagnostics::DiagnosticsEngine;
use cpi_forecast::models::sarima::{ModelFitter, ModelSpec};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_cpi(n: usize) -> TimeSeries {
    let values = (0..n)
        .map(|i| {
            100.15
                + 0.65 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                + ((i * 7 + 3) % 11) as f64 / 50.0
        })
        .collect();
    TimeSeries::from_start(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), values).unwrap()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_fit");
    group.sample_size(10);

    let specs = [
        ("ARIMA(1,0,1)", ModelSpec::non_seasonal(1, 0, 1).unwrap()),
        ("SARIMA(1,0,1)(1,0,1,12)", ModelSpec::default()),
        (
            "SARIMA(0,1,1)(0,1,1,12)",
            ModelSpec::new((0, 1, 1), (0, 1, 1, 12)).unwrap(),
        ),
    ];

    for size in [60, 120, 240].iter() {
        let series = generate_cpi(*size);
        for (name, spec) in &specs {
            group.bench_with_input(BenchmarkId::new(*name, size), size, |b, _| {
                let fitter = ModelFitter::default();
                b.iter(|| fitter.fit(black_box(&series), black_box(spec)))
            });
        }
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarima_forecast");
    let fitted = ModelFitter::default()
        .fit(&generate_cpi(120), &ModelSpec::default())
        .unwrap();

    for horizon in [1, 12, 60].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), horizon, |b, &h| {
            b.iter(|| fitted.forecast(black_box(h), 0.05))
        });
    }

    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let fitted = ModelFitter::default()
        .fit(&generate_cpi(240), &ModelSpec::default())
        .unwrap();
    let engine = DiagnosticsEngine::default();

    c.bench_function("diagnostics_240", |b| {
        b.iter(|| engine.diagnose(black_box(&fitted)))
    });
}

criterion_group!(benches, bench_fit, bench_forecast, bench_diagnostics);
criterion_main!(benches);
