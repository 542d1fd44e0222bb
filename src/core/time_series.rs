//! Monthly time series storage, range filtering and table views.

use crate::error::{ForecastError, Result};
use crate::utils::stats::{mean, std_dev};
use chrono::{Datelike, Months, NaiveDate};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub timestamp: NaiveDate,
    pub value: f64,
}

/// Calendar-month index used to check monthly spacing.
fn month_index(date: &NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// A univariate series of monthly observations.
///
/// Timestamps are consecutive calendar months (the day of month is kept as
/// given), strictly increasing and without gaps. All values are finite.
/// Filters never mutate a series; they return new instances.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDate>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a monthly series from parallel timestamp and value vectors.
    ///
    /// # Errors
    /// - [`ForecastError::EmptyData`] if no observations are given
    /// - [`ForecastError::DimensionMismatch`] if the vectors differ in length
    /// - [`ForecastError::MissingValues`] if any value is NaN or infinite
    /// - [`ForecastError::TimestampError`] if months repeat, go backwards or skip
    pub fn monthly(timestamps: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        for (i, pair) in timestamps.windows(2).enumerate() {
            let step = month_index(&pair[1]) - month_index(&pair[0]);
            if step < 1 {
                return Err(ForecastError::TimestampError(format!(
                    "timestamps must be strictly increasing months (index {})",
                    i + 1
                )));
            }
            if step > 1 {
                return Err(ForecastError::TimestampError(format!(
                    "gap of {} months between {} and {}",
                    step - 1,
                    pair[0],
                    pair[1]
                )));
            }
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Create a monthly series starting at `start`.
    pub fn from_start(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let timestamps = (0..values.len())
            .map(|i| {
                start
                    .checked_add_months(Months::new(i as u32))
                    .ok_or_else(|| {
                        ForecastError::TimestampError(format!(
                            "month {} after {} is out of range",
                            i, start
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::monthly(timestamps, values)
    }

    /// Attach a display label (e.g. the statistic name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_timestamp(&self) -> Option<NaiveDate> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDate> {
        self.timestamps.last().copied()
    }

    /// Iterate over the observations in time order.
    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(&timestamp, &value)| Observation { timestamp, value })
    }

    /// Extract the observations between `start` and `end` (both inclusive).
    pub fn filter_range(&self, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        let from = self.timestamps.partition_point(|t| *t < start);
        let to = self.timestamps.partition_point(|t| *t <= end);
        if from >= to {
            return Err(ForecastError::EmptyData);
        }
        self.slice(from, to)
    }

    /// Trailing window covering the last `years` years up to the final observation.
    pub fn last_years(&self, years: u32) -> Result<TimeSeries> {
        let last = self.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let start = last
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        self.filter_range(start, last)
    }

    /// Extract the observations with index in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start >= end {
            return Err(ForecastError::InvalidParameter(
                "start must be < end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: end,
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            label: self.label.clone(),
        })
    }

    /// Distinct calendar years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.timestamps.iter().map(|t| t.year()).collect();
        years.dedup();
        years
    }

    /// Table rows restricted to the given years and value filter.
    ///
    /// The result may contain gaps, so it is returned as plain rows rather
    /// than as a [`TimeSeries`].
    pub fn select(&self, years: Option<&[i32]>, filter: Option<ValueFilter>) -> Vec<Observation> {
        self.observations()
            .filter(|obs| years.map_or(true, |ys| ys.contains(&obs.timestamp.year())))
            .filter(|obs| filter.map_or(true, |f| f.matches(obs.value)))
            .collect()
    }

    /// Per-year mean, standard deviation, minimum and maximum.
    pub fn yearly_summary(&self) -> Vec<YearlySummary> {
        let mut summaries = Vec::new();
        let mut start = 0;
        while start < self.len() {
            let year = self.timestamps[start].year();
            let end = start
                + self.timestamps[start..]
                    .iter()
                    .take_while(|t| t.year() == year)
                    .count();
            let chunk = &self.values[start..end];
            summaries.push(YearlySummary {
                year,
                count: chunk.len(),
                mean: mean(chunk),
                std: std_dev(chunk),
                min: chunk.iter().copied().fold(f64::INFINITY, f64::min),
                max: chunk.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            });
            start = end;
        }
        summaries
    }

    /// Content hash over timestamps and exact value bits.
    pub fn fingerprint(&self) -> SeriesFingerprint {
        let mut hasher = Sha256::new();
        for (t, v) in self.timestamps.iter().zip(self.values.iter()) {
            hasher.update(t.num_days_from_ce().to_le_bytes());
            hasher.update(v.to_bits().to_le_bytes());
        }
        SeriesFingerprint(hasher.finalize().into())
    }
}

/// Summary statistics for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearlySummary {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN for a single observation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// SHA-256 digest identifying the exact contents of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesFingerprint([u8; 32]);

impl SeriesFingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SeriesFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Threshold filter on observation values, parsed from `">105"`-style text.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueFilter {
    Above(f64),
    AtLeast(f64),
    Below(f64),
    AtMost(f64),
}

impl ValueFilter {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            ValueFilter::Above(t) => value > t,
            ValueFilter::AtLeast(t) => value >= t,
            ValueFilter::Below(t) => value < t,
            ValueFilter::AtMost(t) => value <= t,
        }
    }
}

impl FromStr for ValueFilter {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (ctor, rest): (fn(f64) -> ValueFilter, &str) = if let Some(rest) = s.strip_prefix(">=") {
            (ValueFilter::AtLeast, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (ValueFilter::AtMost, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (ValueFilter::Above, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (ValueFilter::Below, rest)
        } else {
            return Err(ForecastError::InvalidFilter(format!(
                "expected a leading '>', '>=', '<' or '<=' in {:?}",
                s
            )));
        };

        let threshold: f64 = rest
            .trim()
            .parse()
            .map_err(|_| ForecastError::InvalidFilter(format!("bad threshold in {:?}", s)))?;
        if !threshold.is_finite() {
            return Err(ForecastError::InvalidFilter(format!(
                "threshold must be finite in {:?}",
                s
            )));
        }
        Ok(ctor(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn sample_series() -> TimeSeries {
        // Nov 2021 .. Feb 2024
        let values: Vec<f64> = (0..28).map(|i| 100.0 + (i % 5) as f64 * 0.2).collect();
        TimeSeries::from_start(date(2021, 11), values).unwrap()
    }

    #[test]
    fn monthly_accepts_consecutive_months() {
        let ts = TimeSeries::monthly(
            vec![date(2023, 11), date(2023, 12), date(2024, 1)],
            vec![100.1, 100.4, 100.9],
        )
        .unwrap();
        assert_eq!(ts.len(), 3);
        assert_eq!(ts.last_timestamp(), Some(date(2024, 1)));
    }

    #[test]
    fn monthly_rejects_gaps_and_disorder() {
        let gap = TimeSeries::monthly(vec![date(2024, 1), date(2024, 3)], vec![1.0, 2.0]);
        assert!(matches!(gap, Err(ForecastError::TimestampError(_))));

        let repeated = TimeSeries::monthly(
            vec![date(2024, 1), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()],
            vec![1.0, 2.0],
        );
        assert!(matches!(repeated, Err(ForecastError::TimestampError(_))));

        let backwards = TimeSeries::monthly(vec![date(2024, 2), date(2024, 1)], vec![1.0, 2.0]);
        assert!(matches!(backwards, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn monthly_rejects_bad_values() {
        assert!(matches!(
            TimeSeries::monthly(vec![], vec![]),
            Err(ForecastError::EmptyData)
        ));
        assert!(matches!(
            TimeSeries::monthly(vec![date(2024, 1)], vec![1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            TimeSeries::monthly(vec![date(2024, 1), date(2024, 2)], vec![1.0, f64::NAN]),
            Err(ForecastError::MissingValues)
        ));
    }

    #[test]
    fn from_start_rolls_over_years() {
        let ts = TimeSeries::from_start(date(2023, 11), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            ts.timestamps(),
            &[date(2023, 11), date(2023, 12), date(2024, 1)]
        );
    }

    #[test]
    fn filter_range_is_inclusive_and_non_mutating() {
        let ts = sample_series();
        let filtered = ts.filter_range(date(2022, 1), date(2022, 12)).unwrap();
        assert_eq!(filtered.len(), 12);
        assert_eq!(filtered.first_timestamp(), Some(date(2022, 1)));
        assert_eq!(filtered.last_timestamp(), Some(date(2022, 12)));
        assert_eq!(ts.len(), 28);

        assert!(matches!(
            ts.filter_range(date(2030, 1), date(2031, 1)),
            Err(ForecastError::EmptyData)
        ));
        assert!(matches!(
            ts.filter_range(date(2023, 1), date(2022, 1)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn last_years_keeps_trailing_window() {
        let ts = sample_series();
        let recent = ts.last_years(1).unwrap();
        // Feb 2023 .. Feb 2024 inclusive
        assert_eq!(recent.len(), 13);
        assert_eq!(recent.first_timestamp(), Some(date(2023, 2)));

        let everything = ts.last_years(50).unwrap();
        assert_eq!(everything.len(), ts.len());
    }

    #[test]
    fn select_applies_year_and_value_filters() {
        let ts = sample_series();
        let rows = ts.select(Some(&[2022]), None);
        assert_eq!(rows.len(), 12);

        let filter: ValueFilter = ">100.5".parse().unwrap();
        let rows = ts.select(Some(&[2022, 2023]), Some(filter));
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.value > 100.5));
        assert!(rows.iter().all(|r| r.timestamp.year() != 2021));
    }

    #[test]
    fn value_filter_parses_inequalities() {
        assert_eq!("  >105".parse::<ValueFilter>().unwrap(), ValueFilter::Above(105.0));
        assert_eq!("<99.5".parse::<ValueFilter>().unwrap(), ValueFilter::Below(99.5));
        assert_eq!(">= 100".parse::<ValueFilter>().unwrap(), ValueFilter::AtLeast(100.0));
        assert_eq!("<=100".parse::<ValueFilter>().unwrap(), ValueFilter::AtMost(100.0));

        assert!(matches!(
            "105".parse::<ValueFilter>(),
            Err(ForecastError::InvalidFilter(_))
        ));
        assert!(matches!(
            ">abc".parse::<ValueFilter>(),
            Err(ForecastError::InvalidFilter(_))
        ));
        assert!(matches!(
            ">inf".parse::<ValueFilter>(),
            Err(ForecastError::InvalidFilter(_))
        ));

        assert!(ValueFilter::AtLeast(1.0).matches(1.0));
        assert!(!ValueFilter::Above(1.0).matches(1.0));
    }

    #[test]
    fn yearly_summary_groups_by_calendar_year() {
        let ts = TimeSeries::from_start(date(2022, 11), vec![1.0, 3.0, 2.0, 4.0, 6.0]).unwrap();
        let summary = ts.yearly_summary();
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].year, 2022);
        assert_eq!(summary[0].count, 2);
        assert_relative_eq!(summary[0].mean, 2.0, epsilon = 1e-12);
        assert_relative_eq!(summary[0].min, 1.0);
        assert_relative_eq!(summary[0].max, 3.0);

        assert_eq!(summary[1].year, 2023);
        assert_relative_eq!(summary[1].mean, 4.0, epsilon = 1e-12);
        assert_relative_eq!(summary[1].std, 2.0, epsilon = 1e-12);
        assert_eq!(ts.years(), vec![2022, 2023]);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample_series();
        let b = sample_series();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let shorter = a.slice(0, 27).unwrap();
        assert_ne!(a.fingerprint(), shorter.fingerprint());

        let shifted = TimeSeries::from_start(date(2021, 12), a.values().to_vec()).unwrap();
        assert_ne!(a.fingerprint(), shifted.fingerprint());

        assert_eq!(a.fingerprint().to_string().len(), 64);
    }
}
