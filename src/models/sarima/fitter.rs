//! Maximum likelihood estimation of SARIMA models.

use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::diff::apply_differencing;
use super::fitted::FittedModel;
use super::kalman::{filter, FilterOutput, SIGMA2_FLOOR};
use super::params::SarimaParams;
use super::spec::ModelSpec;
use super::state_space::StateSpace;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::optimization::{bfgs, BfgsConfig, BfgsResult};
use crate::utils::stats::{mean, variance};

/// Half-width of the uniform perturbation applied to restart points.
const RESTART_SPREAD: f64 = 0.5;

/// Options controlling estimation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitOptions {
    /// Iteration budget per optimizer run.
    pub max_iter: usize,
    /// Gradient infinity-norm tolerance.
    pub grad_tol: f64,
    /// Relative objective change tolerance.
    pub f_tol: f64,
    /// Profile the innovation variance out of the likelihood.
    pub concentrate_scale: bool,
    /// Remove the sample mean when the model has no differencing.
    pub include_mean: bool,
    /// Perturbed restarts tried when the first run does not converge.
    pub restarts: usize,
    /// Seed for restart perturbations.
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-5,
            f_tol: 1e-10,
            concentrate_scale: true,
            include_mean: true,
            restarts: 2,
            seed: 42,
        }
    }
}

impl FitOptions {
    fn bfgs_config(&self) -> BfgsConfig {
        BfgsConfig {
            max_iter: self.max_iter,
            grad_tol: self.grad_tol,
            f_tol: self.f_tol,
            ..Default::default()
        }
    }
}

// Tolerances compare by bit pattern so options can key a cache.
impl PartialEq for FitOptions {
    fn eq(&self, other: &Self) -> bool {
        self.max_iter == other.max_iter
            && self.grad_tol.to_bits() == other.grad_tol.to_bits()
            && self.f_tol.to_bits() == other.f_tol.to_bits()
            && self.concentrate_scale == other.concentrate_scale
            && self.include_mean == other.include_mean
            && self.restarts == other.restarts
            && self.seed == other.seed
    }
}

impl Eq for FitOptions {}

impl Hash for FitOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.max_iter.hash(state);
        self.grad_tol.to_bits().hash(state);
        self.f_tol.to_bits().hash(state);
        self.concentrate_scale.hash(state);
        self.include_mean.hash(state);
        self.restarts.hash(state);
        self.seed.hash(state);
    }
}

/// Fits SARIMA models by exact Gaussian maximum likelihood.
///
/// The likelihood comes from a Kalman filter over the differenced series.
/// Coefficients are optimized in an unconstrained space that maps onto the
/// stationary and invertible region, so every trial point is admissible.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use cpi_forecast::core::TimeSeries;
/// use cpi_forecast::models::sarima::{ModelFitter, ModelSpec};
///
/// let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
/// let values: Vec<f64> = (0..60)
///     .map(|t| 100.0 + 0.4 * ((t * 7 % 11) as f64 - 5.0) / 5.0)
///     .collect();
/// let series = TimeSeries::from_start(start, values).unwrap();
///
/// let spec = ModelSpec::non_seasonal(1, 0, 0).unwrap();
/// let fitted = ModelFitter::default().fit(&series, &spec).unwrap();
/// assert_eq!(fitted.residuals().len(), 60);
/// assert!(fitted.sigma2() > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelFitter {
    options: FitOptions,
}

impl ModelFitter {
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fit `spec` to `series`.
    ///
    /// Fails eagerly on an inconsistent spec or too few observations.
    /// Optimizer trouble is not an error: the best parameters found are
    /// returned with `converged() == false`.
    pub fn fit(&self, series: &TimeSeries, spec: &ModelSpec) -> Result<FittedModel> {
        let last_timestamp = series.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let values = series.values();
        spec.validate_for(values.len())?;

        let differenced = apply_differencing(values, spec);
        let needed = spec.min_observations();
        if differenced.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: differenced.len(),
            });
        }

        debug!(
            spec = %spec,
            n = values.len(),
            n_differenced = differenced.len(),
            "fitting SARIMA model"
        );

        let model_mean = (spec.differencing_lags() == 0 && self.options.include_mean)
            .then(|| mean(&differenced));
        let centered: Vec<f64> = match model_mean {
            Some(mu) => differenced.iter().map(|w| w - mu).collect(),
            None => differenced,
        };

        let objective = Objective {
            spec,
            data: &centered,
            concentrate_scale: self.options.concentrate_scale,
        };

        let initial = objective.initial_point();
        let best = self.optimize(&objective, &initial);

        let params = SarimaParams::from_unconstrained(spec, &best.optimal_point);
        let output = objective.evaluate(&params)?;

        let mut sigma2 = if self.options.concentrate_scale {
            output.concentrated_scale()
        } else {
            best.optimal_point
                .last()
                .map_or(f64::NAN, |log_sigma2| log_sigma2.exp())
        };
        if !(sigma2.is_finite() && sigma2 >= SIGMA2_FLOOR) {
            warn!(sigma2, floor = SIGMA2_FLOOR, "innovation variance floored");
            sigma2 = SIGMA2_FLOOR;
        }

        let log_likelihood = if self.options.concentrate_scale {
            output.concentrated_log_likelihood()
        } else {
            output.log_likelihood(sigma2)
        };

        let n_obs = output.len();
        let k = (spec.num_coefficients() + 1 + usize::from(model_mean.is_some())) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * (n_obs as f64).ln();

        if !best.converged {
            warn!(
                spec = %spec,
                iterations = best.iterations,
                termination = ?best.termination,
                "optimizer did not converge; returning best parameters found"
            );
        }
        info!(
            spec = %spec,
            log_likelihood,
            aic,
            iterations = best.iterations,
            converged = best.converged,
            "SARIMA fit complete"
        );

        let tail_start = values.len() - spec.differencing_lags();
        let predicted_cov = &output.predicted_cov * sigma2;

        Ok(FittedModel {
            spec: *spec,
            params,
            sigma2,
            mean: model_mean,
            log_likelihood,
            aic,
            bic,
            residuals: output.innovations,
            innovation_variances: output.variances,
            converged: best.converged,
            iterations: best.iterations,
            final_state: output.predicted_state,
            final_covariance: predicted_cov,
            tail: values[tail_start..].to_vec(),
            last_timestamp,
        })
    }

    /// Run BFGS from `initial`, then from perturbed restarts until one
    /// converges or the restart budget is spent. Iterations are summed.
    fn optimize(&self, objective: &Objective<'_>, initial: &[f64]) -> BfgsResult {
        let config = self.options.bfgs_config();
        let run = |start: &[f64]| bfgs(|x| objective.value(x), start, &config);

        let mut best = run(initial);
        if best.converged || self.options.restarts == 0 {
            return best;
        }

        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let mut total_iterations = best.iterations;

        for attempt in 1..=self.options.restarts {
            let start: Vec<f64> = best
                .optimal_point
                .iter()
                .map(|x| x + rng.gen_range(-RESTART_SPREAD..RESTART_SPREAD))
                .collect();
            let candidate = run(&start);
            total_iterations += candidate.iterations;

            debug!(
                attempt,
                value = candidate.optimal_value,
                converged = candidate.converged,
                "optimizer restart"
            );

            let improves = candidate.optimal_value < best.optimal_value - 1e-10;
            let converges_as_well =
                candidate.converged && candidate.optimal_value <= best.optimal_value + 1e-8;
            if improves || converges_as_well {
                best = candidate;
            }
            if best.converged {
                break;
            }
        }

        best.iterations = total_iterations;
        best
    }
}

/// Negative mean log-likelihood over the unconstrained parameter vector.
struct Objective<'a> {
    spec: &'a ModelSpec,
    data: &'a [f64],
    concentrate_scale: bool,
}

impl Objective<'_> {
    fn initial_point(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.spec.num_coefficients()];
        if !self.concentrate_scale {
            let v = variance(self.data);
            let v = if v.is_finite() && v > SIGMA2_FLOOR { v } else { 1.0 };
            x.push(v.ln());
        }
        x
    }

    fn evaluate(&self, params: &SarimaParams) -> Result<FilterOutput> {
        let period = self.spec.period();
        let ss = StateSpace::arma(&params.expanded_ar(period), &params.expanded_ma(period));
        filter(self.data, &ss)
    }

    fn value(&self, x: &[f64]) -> f64 {
        let params = SarimaParams::from_unconstrained(self.spec, x);
        let Ok(output) = self.evaluate(&params) else {
            return f64::INFINITY;
        };
        let ll = if self.concentrate_scale {
            output.concentrated_log_likelihood()
        } else {
            match x.last() {
                Some(log_sigma2) => output.log_likelihood(log_sigma2.exp()),
                None => f64::NAN,
            }
        };
        let value = -ll / self.data.len() as f64;
        if value.is_finite() {
            value
        } else {
            f64::INFINITY
        }
    }
}
