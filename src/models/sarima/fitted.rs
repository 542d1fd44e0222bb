//! Result of a SARIMA fit.

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};

use super::forecaster;
use super::params::SarimaParams;
use super::spec::ModelSpec;
use crate::core::ForecastResult;
use crate::error::Result;

/// An estimated SARIMA model.
///
/// Immutable once produced by [`ModelFitter::fit`](super::ModelFitter::fit);
/// it owns everything needed to forecast and to run residual diagnostics.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub(crate) spec: ModelSpec,
    pub(crate) params: SarimaParams,
    pub(crate) sigma2: f64,
    pub(crate) mean: Option<f64>,
    pub(crate) log_likelihood: f64,
    pub(crate) aic: f64,
    pub(crate) bic: f64,
    pub(crate) residuals: Vec<f64>,
    pub(crate) innovation_variances: Vec<f64>,
    pub(crate) converged: bool,
    pub(crate) iterations: usize,
    /// Predicted ARMA state a_{n+1|n}.
    pub(crate) final_state: DVector<f64>,
    /// Predicted state covariance P_{n+1|n}, scaled by σ².
    pub(crate) final_covariance: DMatrix<f64>,
    /// Last d + sD observations on the original scale, oldest first.
    pub(crate) tail: Vec<f64>,
    pub(crate) last_timestamp: NaiveDate,
}

impl FittedModel {
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Estimated coefficients.
    pub fn params(&self) -> &SarimaParams {
        &self.params
    }

    /// Innovation variance σ². Never below the variance floor.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Mean removed before fitting, present only for undifferenced models
    /// fitted with `include_mean`.
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion.
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// One-step-ahead prediction errors on the differenced scale.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Residuals divided by their predicted standard deviation.
    pub fn standardized_residuals(&self) -> Vec<f64> {
        self.residuals
            .iter()
            .zip(self.innovation_variances.iter())
            .map(|(v, f)| v / (f * self.sigma2).sqrt())
            .collect()
    }

    /// Whether the optimizer met its convergence criterion.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of observations entering the likelihood (after differencing).
    pub fn n_obs(&self) -> usize {
        self.residuals.len()
    }

    /// Number of estimated parameters, including σ² and the mean.
    pub fn num_params(&self) -> usize {
        self.spec.num_coefficients() + 1 + usize::from(self.mean.is_some())
    }

    pub fn final_state(&self) -> &DVector<f64> {
        &self.final_state
    }

    pub fn final_covariance(&self) -> &DMatrix<f64> {
        &self.final_covariance
    }

    /// Timestamp of the last observation used in the fit.
    pub fn last_timestamp(&self) -> NaiveDate {
        self.last_timestamp
    }

    /// Forecast `horizon` months ahead with `1 - alpha` intervals.
    pub fn forecast(&self, horizon: usize, alpha: f64) -> Result<ForecastResult> {
        forecaster::forecast(self, horizon, alpha)
    }
}
