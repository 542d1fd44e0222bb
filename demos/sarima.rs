//! Fit a seasonal model to a monthly CPI series, forecast a year ahead and
//! inspect the residuals.
//!
//! Run with: cargo run --example sarima
//! Set RUST_LOG=cpi_forecast=debug to see the fitting log.

use cpi_forecast::core::PriceDirection;
use cpi_forecast::prelude::*;
use chrono::NaiveDate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cpi_forecast=info".into()),
        )
        .init();

    println!("=== cpi-forecast SARIMA demo ===\n");

    // 1. Ten years of a month-over-month index (previous month = 100)
    let values: Vec<f64> = (0..120)
        .map(|i| {
            100.15                                                          // long-run level
            + 0.65 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()   // yearly pattern
            + 0.08 * ((i * 37 + 11) % 23) as f64 / 23.0                     // irregular part
        })
        .collect();
    let series = TimeSeries::from_start(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(), values)
        .unwrap()
        .with_label("CPI, previous month = 100");
    println!("Loaded {} observations", series.len());

    for year in series.yearly_summary() {
        println!(
            "  {}: mean {:.3}  std {:.3}  range [{:.2}, {:.2}]",
            year.year, year.mean, year.std, year.min, year.max
        );
    }

    // 2. Fit SARIMA(1,0,1)(1,0,1,12)
    let spec = ModelSpec::default();
    println!("\n--- Fitting {} ---", spec);
    let model = ModelFitter::default().fit(&series, &spec).unwrap();

    let params = model.params();
    println!("AR: {:?}  MA: {:?}", params.ar, params.ma);
    println!("SAR: {:?}  SMA: {:?}", params.seasonal_ar, params.seasonal_ma);
    println!("sigma^2: {:.6}", model.sigma2());
    println!("log-likelihood: {:.3}", model.log_likelihood());
    println!("AIC: {:.3}  BIC: {:.3}", model.aic(), model.bic());
    println!(
        "converged: {} after {} iterations",
        model.converged(),
        model.iterations()
    );

    // 3. Forecast 12 months with 95% intervals
    println!("\n--- Forecast (95% intervals) ---");
    let forecast = model.forecast(12, DEFAULT_ALPHA).unwrap();
    println!(
        "{:>10} {:>10} {:>10} {:>10}  {}",
        "month", "lower", "forecast", "upper", "prices"
    );
    println!("{:-<56}", "");
    for record in &forecast {
        let direction = match record.direction(100.0) {
            PriceDirection::Rising => "rising",
            PriceDirection::Falling => "falling",
            PriceDirection::Stable => "stable",
        };
        println!(
            "{:>10} {:>10.3} {:>10.3} {:>10.3}  {}",
            record.timestamp.format("%Y-%m"),
            record.lower_bound,
            record.forecast,
            record.upper_bound,
            direction
        );
    }

    // 4. Residual diagnostics
    println!("\n--- Residual diagnostics ---");
    let report = DiagnosticsEngine::default().diagnose(&model).unwrap();
    println!(
        "residual mean {:.4}, std {:.4}",
        report.residual_mean, report.residual_std
    );
    println!(
        "Ljung-Box Q = {:.3} (lags {}, df {}), p = {:.3}",
        report.ljung_box.statistic, report.ljung_box.lags, report.ljung_box.df, report.ljung_box.p_value
    );
    println!(
        "Jarque-Bera = {:.3}, p = {:.3}",
        report.jarque_bera.statistic, report.jarque_bera.p_value
    );
    let exceeding = report.exceeding_lags();
    if exceeding.is_empty() {
        println!("no ACF lag outside the +/-{:.3} band", report.band);
    } else {
        println!("ACF lags outside the +/-{:.3} band: {:?}", report.band, exceeding);
    }

    // 5. Cached refit is free
    let cache = FitCache::new();
    cache.get_or_fit(&ModelFitter::default(), &series, &spec).unwrap();
    cache.get_or_fit(&ModelFitter::default(), &series, &spec).unwrap();
    let stats = cache.stats();
    println!("\ncache: {} hit(s), {} miss(es)", stats.hits, stats.misses);
}
