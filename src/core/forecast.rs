//! Forecast result structure for holding timestamped predictions.

use chrono::NaiveDate;

/// Movement of a month-over-month index relative to a "no change" baseline.
///
/// The CPI series is quoted as percent of the previous month, so a baseline
/// of 100 separates rising from falling prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriceDirection {
    Rising,
    Falling,
    Stable,
}

/// One forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastRecord {
    pub timestamp: NaiveDate,
    /// Point forecast.
    pub forecast: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Standard deviation of the forecast error.
    pub std_error: f64,
}

impl ForecastRecord {
    /// Width of the confidence interval.
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Forecast error variance.
    pub fn variance(&self) -> f64 {
        self.std_error * self.std_error
    }

    pub fn direction(&self, baseline: f64) -> PriceDirection {
        if self.forecast > baseline {
            PriceDirection::Rising
        } else if self.forecast < baseline {
            PriceDirection::Falling
        } else {
            PriceDirection::Stable
        }
    }
}

/// Point forecasts with confidence intervals at level `1 - alpha`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastResult {
    records: Vec<ForecastRecord>,
    alpha: f64,
}

impl ForecastResult {
    pub(crate) fn new(records: Vec<ForecastRecord>, alpha: f64) -> Self {
        Self { records, alpha }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Significance level the bounds were computed at.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastRecord> {
        self.records.iter()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Point forecasts in step order.
    pub fn point(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.forecast).collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.lower_bound).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.upper_bound).collect()
    }

    /// Forecast error variances in step order.
    pub fn variances(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.variance()).collect()
    }
}

impl<'a> IntoIterator for &'a ForecastResult {
    type Item = &'a ForecastRecord;
    type IntoIter = std::slice::Iter<'a, ForecastRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
