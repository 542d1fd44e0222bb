//! Quasi-Newton optimization for parameter estimation.
//!
//! Gradients are approximated by central finite differences, falling back to
//! forward differences when the central scheme produces non-finite entries.

use finitediff::FiniteDiff;
use nalgebra::{DMatrix, DVector};

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Gradient infinity norm fell below `grad_tol`.
    GradientTolerance,
    /// Relative change in the objective fell below `f_tol`.
    FunctionTolerance,
    /// Iteration budget exhausted.
    MaxIterations,
    /// No acceptable step along steepest descent.
    LineSearchFailed,
    /// Objective or gradient evaluated to NaN or infinity.
    NonFinite,
    /// Nothing to optimize.
    NoParameters,
}

/// Result of BFGS optimization.
#[derive(Debug, Clone)]
pub struct BfgsResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the best point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    pub termination: Termination,
}

/// Configuration for BFGS optimization.
#[derive(Debug, Clone)]
pub struct BfgsConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Gradient infinity-norm tolerance.
    pub grad_tol: f64,
    /// Relative objective change tolerance.
    pub f_tol: f64,
    /// Sufficient decrease constant for the Armijo condition (default: 1e-4).
    pub armijo: f64,
    /// Step shrink factor during backtracking (default: 0.5).
    pub backtrack: f64,
    /// Maximum number of backtracking steps per iteration.
    pub max_backtracks: usize,
    /// Largest allowed step component (default: 2.0).
    pub max_step: f64,
    /// Gradient norm below which a stalled line search still counts as converged.
    pub stall_grad_tol: f64,
}

impl Default for BfgsConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            grad_tol: 1e-5,
            f_tol: 1e-10,
            armijo: 1e-4,
            backtrack: 0.5,
            max_backtracks: 40,
            max_step: 2.0,
            stall_grad_tol: 1e-3,
        }
    }
}

/// Minimize `objective` with BFGS and Armijo backtracking.
///
/// The inverse Hessian approximation starts at the identity, is rescaled after
/// the first accepted step and is reset whenever the search direction stops
/// being a descent direction. The best iterate is always returned, converged
/// or not.
///
/// # Example
/// ```
/// use cpi_forecast::utils::optimization::{bfgs, BfgsConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = bfgs(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &BfgsConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-4);
/// assert!((result.optimal_point[1] - 3.0).abs() < 1e-4);
/// ```
pub fn bfgs<F>(objective: F, initial: &[f64], config: &BfgsConfig) -> BfgsResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return BfgsResult {
            optimal_point: vec![],
            optimal_value: objective(&[]),
            iterations: 0,
            converged: true,
            termination: Termination::NoParameters,
        };
    }

    let mut x = DVector::from_column_slice(initial);
    let mut f = objective(x.as_slice());
    if !f.is_finite() {
        return BfgsResult {
            optimal_point: initial.to_vec(),
            optimal_value: f,
            iterations: 0,
            converged: false,
            termination: Termination::NonFinite,
        };
    }

    let Some(mut g) = gradient(&objective, x.as_slice()) else {
        return BfgsResult {
            optimal_point: initial.to_vec(),
            optimal_value: f,
            iterations: 0,
            converged: false,
            termination: Termination::NonFinite,
        };
    };

    let identity = DMatrix::<f64>::identity(n, n);
    let mut h = identity.clone();
    let mut h_is_identity = true;
    let mut scaled = false;
    let mut iterations = 0;
    let mut termination = Termination::MaxIterations;

    while iterations < config.max_iter {
        if g.amax() < config.grad_tol {
            termination = Termination::GradientTolerance;
            break;
        }
        iterations += 1;

        let mut direction = -(&h * &g);
        let mut slope = direction.dot(&g);
        if slope.is_nan() || slope >= 0.0 {
            h = identity.clone();
            h_is_identity = true;
            direction = -g.clone();
            slope = direction.dot(&g);
        }

        let largest = direction.amax();
        if largest > config.max_step {
            direction *= config.max_step / largest;
            slope *= config.max_step / largest;
        }

        let Some((x_new, f_new)) = line_search(&objective, &x, f, &direction, slope, config)
        else {
            if h_is_identity {
                termination = Termination::LineSearchFailed;
                break;
            }
            h = identity.clone();
            h_is_identity = true;
            continue;
        };

        let Some(g_new) = gradient(&objective, x_new.as_slice()) else {
            x = x_new;
            f = f_new;
            termination = Termination::NonFinite;
            break;
        };

        let s = &x_new - &x;
        let y = &g_new - &g;
        let f_change = (f - f_new).abs();
        let f_scale = f.abs().max(f_new.abs()).max(1.0);

        x = x_new;
        f = f_new;
        g = g_new;

        if f_change <= config.f_tol * f_scale {
            termination = Termination::FunctionTolerance;
            break;
        }

        let sy = s.dot(&y);
        if sy > 1e-10 {
            if !scaled {
                let yy = y.dot(&y);
                if yy > 0.0 {
                    h = &identity * (sy / yy);
                }
                scaled = true;
            }
            let rho = 1.0 / sy;
            let left = &identity - (&s * y.transpose()) * rho;
            let right = &identity - (&y * s.transpose()) * rho;
            h = &left * &h * &right + (&s * s.transpose()) * rho;
            h_is_identity = false;
        }
    }

    if termination == Termination::MaxIterations && g.amax() < config.grad_tol {
        termination = Termination::GradientTolerance;
    }

    let converged = match termination {
        Termination::GradientTolerance | Termination::FunctionTolerance => true,
        Termination::LineSearchFailed => g.amax() < config.stall_grad_tol,
        _ => false,
    };

    BfgsResult {
        optimal_point: x.as_slice().to_vec(),
        optimal_value: f,
        iterations,
        converged,
        termination,
    }
}

/// Backtracking line search satisfying the Armijo condition.
fn line_search<F>(
    objective: &F,
    x: &DVector<f64>,
    f: f64,
    direction: &DVector<f64>,
    slope: f64,
    config: &BfgsConfig,
) -> Option<(DVector<f64>, f64)>
where
    F: Fn(&[f64]) -> f64,
{
    let mut step = 1.0;
    for _ in 0..config.max_backtracks {
        let candidate = x + direction * step;
        let value = objective(candidate.as_slice());
        if value.is_finite() && value <= f + config.armijo * step * slope {
            return Some((candidate, value));
        }
        step *= config.backtrack;
    }
    None
}

/// Finite-difference gradient, `None` when no scheme yields finite entries.
fn gradient<F>(objective: &F, x: &[f64]) -> Option<DVector<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let point = x.to_vec();
    let cost = |p: &Vec<f64>| objective(p);

    let central = point.central_diff(&cost);
    if central.iter().all(|v| v.is_finite()) {
        return Some(DVector::from_vec(central));
    }
    let forward = point.forward_diff(&cost);
    if forward.iter().all(|v| v.is_finite()) {
        return Some(DVector::from_vec(forward));
    }
    None
}
