//! Residual diagnostics for fitted models.

use tracing::debug;

use super::autocorrelation::{acf, pacf, significance_band};
use super::normality::{jarque_bera, qq_plot, JarqueBeraResult, QqPlot};
use super::residual_tests::{ljung_box, LjungBoxResult};
use crate::error::{ForecastError, Result};
use crate::models::sarima::FittedModel;
use crate::utils::stats::{mean, std_dev};

/// Lag bound used when none is configured.
pub const DEFAULT_MAX_LAG: usize = 40;

/// Configuration for [`DiagnosticsEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticsConfig {
    /// Largest ACF/PACF lag. `None` means [`DEFAULT_MAX_LAG`], shortened to
    /// fit short residual series; an explicit value is never adjusted.
    pub max_lag: Option<usize>,
    /// Significance level of the white-noise band.
    pub alpha: f64,
    /// Lags for the Ljung-Box test; `None` uses min(10, n/5).
    pub ljung_box_lags: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            alpha: 0.05,
            ljung_box_lags: None,
        }
    }
}

/// Everything the residual view needs, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticsResult {
    /// Autocorrelation at lags 0..=max_lag.
    pub acf: Vec<f64>,
    /// Partial autocorrelation at lags 1..=max_lag.
    pub pacf: Vec<f64>,
    /// Half-width of the white-noise band.
    pub band: f64,
    pub qq: QqPlot,
    pub residual_mean: f64,
    pub residual_std: f64,
    pub ljung_box: LjungBoxResult,
    pub jarque_bera: JarqueBeraResult,
    /// Number of residuals analysed.
    pub n: usize,
}

impl DiagnosticsResult {
    pub fn max_lag(&self) -> usize {
        self.pacf.len()
    }

    /// ACF lags (excluding 0) outside the white-noise band.
    pub fn exceeding_lags(&self) -> Vec<usize> {
        self.acf
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, r)| r.abs() > self.band)
            .map(|(lag, _)| lag)
            .collect()
    }

    /// PACF lags outside the white-noise band.
    pub fn pacf_exceeding_lags(&self) -> Vec<usize> {
        self.pacf
            .iter()
            .enumerate()
            .filter(|(_, r)| r.abs() > self.band)
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// Computes ACF, PACF, Q-Q data and summary tests for model residuals.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsEngine {
    config: DiagnosticsConfig,
}

impl DiagnosticsEngine {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Diagnose the residuals of a fitted model. The Ljung-Box degrees of
    /// freedom are reduced by the number of estimated ARMA coefficients.
    pub fn diagnose(&self, model: &FittedModel) -> Result<DiagnosticsResult> {
        self.analyse(model.residuals(), model.spec().num_coefficients())
    }

    /// Diagnose an arbitrary residual series.
    pub fn run(&self, residuals: &[f64]) -> Result<DiagnosticsResult> {
        self.analyse(residuals, 0)
    }

    fn analyse(&self, residuals: &[f64], fitted_params: usize) -> Result<DiagnosticsResult> {
        let n = residuals.len();
        if n == 0 {
            return Err(ForecastError::EmptyData);
        }
        if !(self.config.alpha > 0.0 && self.config.alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.config.alpha
            )));
        }

        let max_lag = self
            .config
            .max_lag
            .unwrap_or_else(|| DEFAULT_MAX_LAG.min(n - 1));
        debug!(n, max_lag, "running residual diagnostics");

        let residual_std = std_dev(residuals);

        Ok(DiagnosticsResult {
            acf: acf(residuals, max_lag)?,
            pacf: pacf(residuals, max_lag)?,
            band: significance_band(n, self.config.alpha),
            qq: qq_plot(residuals)?,
            residual_mean: mean(residuals),
            residual_std: if residual_std.is_finite() { residual_std } else { 0.0 },
            ljung_box: ljung_box(residuals, self.config.ljung_box_lags, fitted_params),
            jarque_bera: jarque_bera(residuals),
            n,
        })
    }
}
