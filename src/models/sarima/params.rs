//! SARIMA coefficients and their unconstrained parameterisation.
//!
//! Sign conventions: φ(B) = 1 - φ₁B - … - φ_pB^p for the autoregressive side
//! and θ(B) = 1 + θ₁B + … + θ_qB^q for the moving-average side, with the
//! seasonal polynomials defined the same way in B^s.

use super::diff::poly_mul;
use super::spec::ModelSpec;

/// Keeps partial autocorrelations strictly inside the unit interval.
const PACF_SHRINK: f64 = 1.0 - 1e-6;

/// Estimated SARIMA coefficients.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SarimaParams {
    /// Non-seasonal AR coefficients φ₁..φ_p.
    pub ar: Vec<f64>,
    /// Non-seasonal MA coefficients θ₁..θ_q.
    pub ma: Vec<f64>,
    /// Seasonal AR coefficients Φ₁..Φ_P.
    pub seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients Θ₁..Θ_Q.
    pub seasonal_ma: Vec<f64>,
}

impl SarimaParams {
    /// All-zero coefficients for `spec`.
    pub fn zeros(spec: &ModelSpec) -> Self {
        Self {
            ar: vec![0.0; spec.p()],
            ma: vec![0.0; spec.q()],
            seasonal_ar: vec![0.0; spec.seasonal_p()],
            seasonal_ma: vec![0.0; spec.seasonal_q()],
        }
    }

    /// Map an unconstrained vector to stationary, invertible coefficients.
    ///
    /// `x` holds the AR, MA, seasonal AR and seasonal MA blocks in that order
    /// and must have at least [`ModelSpec::num_coefficients`] entries; any
    /// trailing entries are ignored.
    pub fn from_unconstrained(spec: &ModelSpec, x: &[f64]) -> Self {
        let (ar, rest) = x.split_at(spec.p());
        let (ma, rest) = rest.split_at(spec.q());
        let (seasonal_ar, rest) = rest.split_at(spec.seasonal_p());
        let (seasonal_ma, _) = rest.split_at(spec.seasonal_q());

        Self {
            ar: constrain_stationary(ar),
            ma: constrain_invertible(ma),
            seasonal_ar: constrain_stationary(seasonal_ar),
            seasonal_ma: constrain_invertible(seasonal_ma),
        }
    }

    /// Inverse of [`SarimaParams::from_unconstrained`].
    pub fn to_unconstrained(&self) -> Vec<f64> {
        let mut x = unconstrain_stationary(&self.ar);
        x.extend(unconstrain_invertible(&self.ma));
        x.extend(unconstrain_stationary(&self.seasonal_ar));
        x.extend(unconstrain_invertible(&self.seasonal_ma));
        x
    }

    /// Coefficients in estimation order: AR, MA, seasonal AR, seasonal MA.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut v = self.ar.clone();
        v.extend_from_slice(&self.ma);
        v.extend_from_slice(&self.seasonal_ar);
        v.extend_from_slice(&self.seasonal_ma);
        v
    }

    /// Expanded AR coefficients a₁..a_{p+sP} of φ(B)Φ(B^s), so that
    /// `w_t = Σ a_i w_{t-i} + …`.
    pub fn expanded_ar(&self, period: usize) -> Vec<f64> {
        let poly = poly_mul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, period, -1.0),
        );
        poly.iter().skip(1).map(|c| -c).collect()
    }

    /// Expanded MA coefficients b₁..b_{q+sQ} of θ(B)Θ(B^s).
    pub fn expanded_ma(&self, period: usize) -> Vec<f64> {
        let poly = poly_mul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, period, 1.0),
        );
        poly.into_iter().skip(1).collect()
    }
}

/// `1 + sign·(c₁B^step + c₂B^{2·step} + …)` as ascending coefficients.
fn lag_polynomial(coefs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coefs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Map free reals to the coefficients of a stationary AR polynomial.
///
/// Each entry becomes a partial autocorrelation through `tanh`, and the
/// Durbin-Levinson recursion turns those into AR coefficients.
pub fn constrain_stationary(x: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(x.len());
    for (k, &xk) in x.iter().enumerate() {
        let r = xk.tanh() * PACF_SHRINK;
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}

/// Inverse of [`constrain_stationary`].
pub fn unconstrain_stationary(phi: &[f64]) -> Vec<f64> {
    let mut current = phi.to_vec();
    let mut x = vec![0.0; phi.len()];
    for k in (0..phi.len()).rev() {
        let r = current[k].clamp(-PACF_SHRINK, PACF_SHRINK);
        x[k] = (r / PACF_SHRINK).clamp(-1.0 + 1e-12, 1.0 - 1e-12).atanh();
        let denom = 1.0 - r * r;
        let prev: Vec<f64> = (0..k)
            .map(|j| (current[j] + r * current[k - 1 - j]) / denom)
            .collect();
        current = prev;
    }
    x
}

/// Map free reals to the coefficients of an invertible MA polynomial.
pub fn constrain_invertible(x: &[f64]) -> Vec<f64> {
    constrain_stationary(x).into_iter().map(|c| -c).collect()
}

/// Inverse of [`constrain_invertible`].
pub fn unconstrain_invertible(theta: &[f64]) -> Vec<f64> {
    let flipped: Vec<f64> = theta.iter().map(|c| -c).collect();
    unconstrain_stationary(&flipped)
}
