//! ARMA state-space representation (Harvey form).
//!
//! ```text
//! α[t+1] = T α[t] + R ε[t]
//! w[t]   = Z' α[t]
//! ```
//!
//! `T` is the companion matrix of the expanded AR polynomial, `R` carries the
//! expanded MA coefficients and `Z = e₁`. There is no measurement noise.

use nalgebra::{DMatrix, DVector};

use crate::error::{ForecastError, Result};

const DOUBLING_MAX_ITER: usize = 100;
const DOUBLING_TOL: f64 = 1e-12;

/// Time-invariant ARMA system matrices, unit innovation variance.
#[derive(Debug, Clone)]
pub struct StateSpace {
    transition: DMatrix<f64>,
    selection: DVector<f64>,
}

impl StateSpace {
    /// Build the companion form for expanded AR coefficients `ar` and MA
    /// coefficients `ma`. The state dimension is `max(len(ar), len(ma) + 1)`.
    pub fn arma(ar: &[f64], ma: &[f64]) -> Self {
        let dim = ar.len().max(ma.len() + 1);

        let mut transition = DMatrix::<f64>::zeros(dim, dim);
        for (i, &a) in ar.iter().enumerate() {
            transition[(i, 0)] = a;
        }
        for i in 0..dim - 1 {
            transition[(i, i + 1)] = 1.0;
        }

        let mut selection = DVector::<f64>::zeros(dim);
        selection[0] = 1.0;
        for (j, &b) in ma.iter().enumerate() {
            selection[j + 1] = b;
        }

        Self {
            transition,
            selection,
        }
    }

    pub fn dim(&self) -> usize {
        self.selection.len()
    }

    pub fn transition(&self) -> &DMatrix<f64> {
        &self.transition
    }

    pub fn selection(&self) -> &DVector<f64> {
        &self.selection
    }

    /// R R'.
    pub fn state_noise(&self) -> DMatrix<f64> {
        &self.selection * self.selection.transpose()
    }

    /// Unconditional state covariance: the solution of `P = T P T' + R R'`.
    ///
    /// Solved by the doubling recursion `P ← P + A P A'`, `A ← A²`, which
    /// converges whenever the AR polynomial is stationary.
    pub fn stationary_covariance(&self) -> Result<DMatrix<f64>> {
        let mut p = self.state_noise();
        let mut a = self.transition.clone();

        for _ in 0..DOUBLING_MAX_ITER {
            let increment = &a * &p * a.transpose();
            p += &increment;

            let change = increment.amax();
            if !change.is_finite() {
                break;
            }
            if change <= DOUBLING_TOL * p.amax().max(1.0) {
                return Ok(symmetrize(p));
            }
            a = &a * &a;
        }

        Err(ForecastError::ComputationError(
            "stationary state covariance did not converge".to_string(),
        ))
    }
}

/// Average a square matrix with its transpose.
pub(crate) fn symmetrize(m: DMatrix<f64>) -> DMatrix<f64> {
    (&m + m.transpose()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn white_noise_has_unit_state() {
        let ss = StateSpace::arma(&[], &[]);
        assert_eq!(ss.dim(), 1);
        let p0 = ss.stationary_covariance().unwrap();
        assert_relative_eq!(p0[(0, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ar1_variance_is_one_over_one_minus_phi_squared() {
        let phi: f64 = 0.8;
        let ss = StateSpace::arma(&[phi], &[]);
        let p0 = ss.stationary_covariance().unwrap();
        assert_relative_eq!(p0[(0, 0)], 1.0 / (1.0 - phi * phi), epsilon = 1e-9);
    }

    #[test]
    fn ma1_variance() {
        let theta = 0.5;
        let ss = StateSpace::arma(&[], &[theta]);
        assert_eq!(ss.dim(), 2);
        let p0 = ss.stationary_covariance().unwrap();
        // Var(w) = 1 + θ²
        assert_relative_eq!(p0[(0, 0)], 1.0 + theta * theta, epsilon = 1e-12);
    }

    #[test]
    fn arma11_variance() {
        let (phi, theta): (f64, f64) = (0.6, 0.3);
        let ss = StateSpace::arma(&[phi], &[theta]);
        let p0 = ss.stationary_covariance().unwrap();
        let expected = (1.0 + 2.0 * phi * theta + theta * theta) / (1.0 - phi * phi);
        assert_relative_eq!(p0[(0, 0)], expected, epsilon = 1e-9);
    }

    #[test]
    fn companion_layout() {
        let ss = StateSpace::arma(&[0.5, -0.2, 0.1], &[0.4]);
        let t = ss.transition();
        assert_eq!(ss.dim(), 3);
        assert_relative_eq!(t[(0, 0)], 0.5);
        assert_relative_eq!(t[(1, 0)], -0.2);
        assert_relative_eq!(t[(2, 0)], 0.1);
        assert_relative_eq!(t[(0, 1)], 1.0);
        assert_relative_eq!(t[(1, 2)], 1.0);
        assert_relative_eq!(t[(2, 2)], 0.0);
        assert_eq!(ss.selection().as_slice(), &[1.0, 0.4, 0.0]);
    }

    #[test]
    fn stationary_covariance_solves_lyapunov() {
        let ss = StateSpace::arma(&[0.3, 0.0, 0.0, 0.4, -0.12], &[0.2, 0.0, 0.0, 0.5, 0.1]);
        let p0 = ss.stationary_covariance().unwrap();
        let t = ss.transition();
        let residual = &p0 - (t * &p0 * t.transpose() + ss.state_noise());
        assert!(residual.amax() < 1e-9);
    }

    #[test]
    fn explosive_system_fails() {
        let ss = StateSpace::arma(&[1.5], &[]);
        assert!(matches!(
            ss.stationary_covariance(),
            Err(ForecastError::ComputationError(_))
        ));
    }
}
