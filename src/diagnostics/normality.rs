//! Normality checks for residuals: Q-Q coordinates and the Jarque-Bera test.

use crate::error::{ForecastError, Result};
use crate::utils::stats::{chi_squared_sf, kurtosis, mean, quantile_normal, skewness, std_dev};

/// Line `y = intercept + slope·x` overlaid on a Q-Q plot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLine {
    pub intercept: f64,
    pub slope: f64,
}

impl ReferenceLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Residual quantiles against standard normal quantiles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QqPlot {
    /// Theoretical standard normal quantiles, ascending.
    pub theoretical: Vec<f64>,
    /// Residuals sorted ascending.
    pub sample: Vec<f64>,
    /// Intercept is the residual mean, slope the residual standard deviation.
    pub line: ReferenceLine,
}

impl QqPlot {
    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    /// `(theoretical, sample)` coordinate pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.theoretical
            .iter()
            .copied()
            .zip(self.sample.iter().copied())
    }
}

/// Filliben's estimate of the order statistic medians of a uniform sample.
fn filliben_positions(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let last = 0.5_f64.powf(1.0 / n as f64);
    let mut positions: Vec<f64> = (1..=n)
        .map(|i| (i as f64 - 0.3175) / (n as f64 + 0.365))
        .collect();
    positions[0] = 1.0 - last;
    positions[n - 1] = last;
    positions
}

/// Build Q-Q coordinates for `residuals`.
///
/// Residuals are sorted ascending and paired with normal quantiles at
/// Filliben plotting positions. A single residual gets a zero slope.
pub fn qq_plot(residuals: &[f64]) -> Result<QqPlot> {
    if residuals.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let mut sample = residuals.to_vec();
    sample.sort_by(|a, b| a.total_cmp(b));

    let theoretical = filliben_positions(sample.len())
        .into_iter()
        .map(quantile_normal)
        .collect();

    let slope = std_dev(residuals);
    let line = ReferenceLine {
        intercept: mean(residuals),
        slope: if slope.is_finite() { slope } else { 0.0 },
    };

    Ok(QqPlot {
        theoretical,
        sample,
        line,
    })
}

/// Jarque-Bera test result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JarqueBeraResult {
    pub statistic: f64,
    /// Upper tail probability under χ²(2).
    pub p_value: f64,
    pub skewness: f64,
    /// Kurtosis (3 for a normal distribution).
    pub kurtosis: f64,
}

impl JarqueBeraResult {
    /// True when normality is not rejected at `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Jarque-Bera test of residual normality.
///
/// `JB = n/6 · (S² + (K - 3)²/4)`, compared against χ²(2).
pub fn jarque_bera(residuals: &[f64]) -> JarqueBeraResult {
    let n = residuals.len();
    if n < 3 {
        return JarqueBeraResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            skewness: f64::NAN,
            kurtosis: f64::NAN,
        };
    }

    let s = skewness(residuals);
    let k = kurtosis(residuals);
    let statistic = n as f64 / 6.0 * (s * s + (k - 3.0).powi(2) / 4.0);

    JarqueBeraResult {
        statistic,
        p_value: chi_squared_sf(statistic, 2),
        skewness: s,
        kurtosis: k,
    }
}
