//! Querying the stored CPI series: ranges, year tables and summaries.

use chrono::NaiveDate;
use cpi_forecast::core::{TimeSeries, ValueFilter};
use cpi_forecast::ForecastError;

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

/// Three years starting January 2021, rising 0.1 per month from 99.5.
fn cpi() -> TimeSeries {
    let values = (0..36).map(|i| 99.5 + 0.1 * i as f64).collect();
    TimeSeries::from_start(date(2021, 1), values)
        .unwrap()
        .with_label("CPI, previous month = 100")
}

#[test]
fn range_filter_is_inclusive() {
    let window = cpi().filter_range(date(2022, 3), date(2022, 8)).unwrap();
    assert_eq!(window.len(), 6);
    assert_eq!(window.first_timestamp(), Some(date(2022, 3)));
    assert_eq!(window.last_timestamp(), Some(date(2022, 8)));
    assert_eq!(window.label(), Some("CPI, previous month = 100"));
}

#[test]
fn range_outside_the_data_is_empty() {
    assert_eq!(
        cpi().filter_range(date(2030, 1), date(2030, 12)).unwrap_err(),
        ForecastError::EmptyData
    );
    assert!(matches!(
        cpi().filter_range(date(2022, 6), date(2022, 1)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn last_years_window() {
    let recent = cpi().last_years(1).unwrap();
    // December 2022 through December 2023.
    assert_eq!(recent.len(), 13);
    assert_eq!(recent.first_timestamp(), Some(date(2022, 12)));
}

#[test]
fn select_by_year_and_threshold() {
    let series = cpi();
    let filter: ValueFilter = ">= 101".parse().unwrap();

    let rows = series.select(Some(&[2022]), Some(filter));
    assert!(rows.iter().all(|r| r.timestamp.format("%Y").to_string() == "2022"));
    assert!(rows.iter().all(|r| r.value >= 101.0 - 1e-9));
    // 2022 runs 100.7..=101.8; values from 101.0 on pass.
    assert!(rows.len() >= 8 && rows.len() <= 9);

    let all = series.select(None, None);
    assert_eq!(all.len(), 36);
}

#[test]
fn bad_filters_are_rejected() {
    assert!(matches!(
        "== 100".parse::<ValueFilter>(),
        Err(ForecastError::InvalidFilter(_))
    ));
    assert!(matches!(
        "> abc".parse::<ValueFilter>(),
        Err(ForecastError::InvalidFilter(_))
    ));
}

#[test]
fn yearly_summary_covers_each_year() {
    let summary = cpi().yearly_summary();
    assert_eq!(summary.len(), 3);
    assert_eq!(
        summary.iter().map(|s| s.year).collect::<Vec<_>>(),
        vec![2021, 2022, 2023]
    );
    for s in &summary {
        assert_eq!(s.count, 12);
        assert!(s.min <= s.mean && s.mean <= s.max);
        assert!(s.std > 0.0);
    }
    assert!((summary[0].mean - 100.05).abs() < 1e-9);
}

#[test]
fn fingerprint_tracks_content() {
    let a = cpi();
    let b = cpi().with_label("renamed");
    let c = TimeSeries::from_start(date(2021, 2), a.values().to_vec()).unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}
