//! Kalman filter and Gaussian log-likelihood for the ARMA state space.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use super::state_space::{symmetrize, StateSpace};
use crate::error::{ForecastError, Result};

/// Smallest innovation variance the engine will report or evaluate.
pub const SIGMA2_FLOOR: f64 = 1e-10;

/// Output of one filter pass. Covariances are in units of σ².
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// One-step-ahead prediction errors v_t.
    pub innovations: Vec<f64>,
    /// Prediction error variances F_t.
    pub variances: Vec<f64>,
    /// Predicted state a_{n+1|n}.
    pub predicted_state: DVector<f64>,
    /// Predicted covariance P_{n+1|n}.
    pub predicted_cov: DMatrix<f64>,
}

impl FilterOutput {
    pub fn len(&self) -> usize {
        self.innovations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.innovations.is_empty()
    }

    /// Σ v_t² / F_t.
    pub fn weighted_sum_of_squares(&self) -> f64 {
        self.innovations
            .iter()
            .zip(self.variances.iter())
            .map(|(v, f)| v * v / f)
            .sum()
    }

    /// Σ ln F_t.
    pub fn sum_log_variances(&self) -> f64 {
        self.variances.iter().map(|f| f.ln()).sum()
    }

    /// Maximum likelihood estimate of σ² given the filter output.
    pub fn concentrated_scale(&self) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        self.weighted_sum_of_squares() / self.len() as f64
    }

    /// Gaussian log-likelihood with σ² profiled out.
    pub fn concentrated_log_likelihood(&self) -> f64 {
        let n = self.len() as f64;
        let sigma2 = self.concentrated_scale().max(SIGMA2_FLOOR);
        -0.5 * n * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * self.sum_log_variances()
    }

    /// Gaussian log-likelihood at an explicit σ².
    pub fn log_likelihood(&self, sigma2: f64) -> f64 {
        let n = self.len() as f64;
        let sigma2 = sigma2.max(SIGMA2_FLOOR);
        -0.5 * n * ((2.0 * PI).ln() + sigma2.ln())
            - 0.5 * self.sum_log_variances()
            - 0.5 * self.weighted_sum_of_squares() / sigma2
    }
}

/// Run the filter over a zero-mean series, starting from the stationary
/// distribution of the state.
pub fn filter(series: &[f64], ss: &StateSpace) -> Result<FilterOutput> {
    let k = ss.dim();
    let t_mat = ss.transition();
    let t_mat_t = t_mat.transpose();
    let rr = ss.state_noise();

    let mut a = DVector::<f64>::zeros(k);
    let mut p = ss.stationary_covariance()?;

    let mut innovations = Vec::with_capacity(series.len());
    let mut variances = Vec::with_capacity(series.len());

    let mut a_next = DVector::<f64>::zeros(k);
    let mut temp = DMatrix::<f64>::zeros(k, k);

    for (t, &w) in series.iter().enumerate() {
        // Z = e₁, so Z'a and PZ are the first entry and first column.
        let v = w - a[0];
        let f = p[(0, 0)];
        if !(f.is_finite() && f > 0.0) {
            return Err(ForecastError::ComputationError(format!(
                "non-positive prediction variance at t={} (F={})",
                t, f
            )));
        }
        innovations.push(v);
        variances.push(f);

        let pz: DVector<f64> = p.column(0).into_owned();
        a.axpy(v / f, &pz, 1.0);
        p.ger(-1.0 / f, &pz, &pz, 1.0);

        a_next.gemv(1.0, t_mat, &a, 0.0);
        temp.gemm(1.0, t_mat, &p, 0.0);
        p.gemm(1.0, &temp, &t_mat_t, 0.0);
        p += &rr;
        std::mem::swap(&mut a, &mut a_next);
    }

    Ok(FilterOutput {
        innovations,
        variances,
        predicted_state: a,
        predicted_cov: symmetrize(p),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn white_noise_innovations_equal_data() {
        let data = vec![0.5, -1.0, 0.25, 2.0];
        let out = filter(&data, &StateSpace::arma(&[], &[])).unwrap();

        assert_eq!(out.innovations, data);
        assert!(out.variances.iter().all(|&f| (f - 1.0).abs() < 1e-12));
        let ss: f64 = data.iter().map(|x| x * x).sum();
        assert_relative_eq!(out.concentrated_scale(), ss / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn ar1_matches_exact_likelihood() {
        let phi: f64 = 0.6;
        let data = vec![0.3, 0.9, -0.4, 0.1, 0.7];
        let out = filter(&data, &StateSpace::arma(&[phi], &[])).unwrap();

        // First prediction uses the stationary variance, then F = 1.
        assert_relative_eq!(out.variances[0], 1.0 / (1.0 - phi * phi), epsilon = 1e-9);
        for t in 1..data.len() {
            assert_relative_eq!(out.variances[t], 1.0, epsilon = 1e-9);
            assert_relative_eq!(out.innovations[t], data[t] - phi * data[t - 1], epsilon = 1e-9);
        }
        assert_relative_eq!(out.predicted_state[0], phi * data[4], epsilon = 1e-9);

        // Exact AR(1) log-likelihood at σ² = 1
        let mut expected = -0.5 * (2.0 * PI).ln() + 0.5 * (1.0 - phi * phi).ln()
            - 0.5 * (1.0 - phi * phi) * data[0] * data[0];
        for t in 1..data.len() {
            let e = data[t] - phi * data[t - 1];
            expected += -0.5 * (2.0 * PI).ln() - 0.5 * e * e;
        }
        assert_relative_eq!(out.log_likelihood(1.0), expected, epsilon = 1e-9);
    }

    #[test]
    fn concentrated_likelihood_is_max_over_scale() {
        let data = vec![0.3, 0.9, -0.4, 0.1, 0.7, -0.2, 0.05];
        let out = filter(&data, &StateSpace::arma(&[0.4], &[0.3])).unwrap();
        let sigma2 = out.concentrated_scale();

        let at_optimum = out.log_likelihood(sigma2);
        assert_relative_eq!(out.concentrated_log_likelihood(), at_optimum, epsilon = 1e-10);
        assert!(out.log_likelihood(sigma2 * 1.2) < at_optimum);
        assert!(out.log_likelihood(sigma2 * 0.8) < at_optimum);
    }

    #[test]
    fn zero_series_is_floored_not_infinite() {
        let out = filter(&[0.0; 10], &StateSpace::arma(&[], &[])).unwrap();
        assert_eq!(out.concentrated_scale(), 0.0);
        assert!(out.concentrated_log_likelihood().is_finite());
    }

    #[test]
    fn explosive_model_is_rejected() {
        assert!(filter(&[1.0, 2.0], &StateSpace::arma(&[1.2], &[])).is_err());
    }
}
