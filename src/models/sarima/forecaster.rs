//! Multi-step forecasts with analytic confidence intervals.
//!
//! The ARMA state is augmented with the last `d + sD` observations so that
//! undoing the differencing happens inside the state recursion:
//!
//! ```text
//! y[T+h] = μ + α[T+h]₁ + Σ c_k y[T+h-k],   δ(B) = 1 - Σ c_k B^k
//! ```
//!
//! Mean and covariance of the augmented state are propagated jointly, which
//! gives exact forecast variances on the original scale.

use chrono::Months;
use nalgebra::{DMatrix, DVector};

use super::diff::differencing_polynomial;
use super::fitted::FittedModel;
use super::state_space::{symmetrize, StateSpace};
use crate::core::{ForecastRecord, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::utils::stats::quantile_normal;

/// Significance level used when the caller has no preference (95% intervals).
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Forecast `horizon` months past the end of the fitted series.
///
/// Bounds are `forecast ± z(1 - α/2)·std_error`.
///
/// # Errors
/// - [`ForecastError::InvalidHorizon`] when `horizon == 0`
/// - [`ForecastError::InvalidParameter`] when `alpha` is outside (0, 1)
pub fn forecast(model: &FittedModel, horizon: usize, alpha: f64) -> Result<ForecastResult> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon(horizon));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )));
    }

    let spec = model.spec();
    let period = spec.period();
    let arma = StateSpace::arma(
        &model.params().expanded_ar(period),
        &model.params().expanded_ma(period),
    );
    let r = arma.dim();

    // c_k = -δ_k for k = 1..m
    let lag_coefs: Vec<f64> = differencing_polynomial(spec)
        .iter()
        .skip(1)
        .map(|d| -d)
        .collect();
    let m = lag_coefs.len();
    let dim = r + m;

    let mut transition = DMatrix::<f64>::zeros(dim, dim);
    transition
        .view_mut((0, 0), (r, r))
        .copy_from(arma.transition());
    if m > 0 {
        transition[(r, 0)] = 1.0;
        for (j, &c) in lag_coefs.iter().enumerate() {
            transition[(r, r + j)] = c;
        }
        for j in 1..m {
            transition[(r + j, r + j - 1)] = 1.0;
        }
    }

    let mut selection = DVector::<f64>::zeros(dim);
    selection.rows_mut(0, r).copy_from(arma.selection());
    let noise = &selection * selection.transpose() * model.sigma2();

    let mut design = DVector::<f64>::zeros(dim);
    design[0] = 1.0;
    for (j, &c) in lag_coefs.iter().enumerate() {
        design[r + j] = c;
    }

    let mut state = DVector::<f64>::zeros(dim);
    state.rows_mut(0, r).copy_from(model.final_state());
    // Lags are stored newest first.
    for (j, &y) in model.tail.iter().rev().enumerate() {
        state[r + j] = y;
    }

    let mut cov = DMatrix::<f64>::zeros(dim, dim);
    cov.view_mut((0, 0), (r, r))
        .copy_from(model.final_covariance());

    let level = model.mean().unwrap_or(0.0);
    let z = quantile_normal(1.0 - alpha / 2.0);
    let transition_t = transition.transpose();

    let mut records = Vec::with_capacity(horizon);
    let mut variance = 0.0_f64;
    for h in 1..=horizon {
        let point = level + design.dot(&state);
        // The part of P_{n+1|n} that decays under T can outpace the added
        // noise when a seasonal AR root nearly cancels a seasonal MA root.
        // Forecast error variance must not fall with the horizon.
        variance = variance.max((&cov * &design).dot(&design));
        let std_error = variance.sqrt();

        let timestamp = model
            .last_timestamp()
            .checked_add_months(Months::new(h as u32))
            .ok_or_else(|| {
                ForecastError::TimestampError(format!(
                    "forecast step {} after {} is out of range",
                    h,
                    model.last_timestamp()
                ))
            })?;

        records.push(ForecastRecord {
            timestamp,
            forecast: point,
            lower_bound: point - z * std_error,
            upper_bound: point + z * std_error,
            std_error,
        });

        state = &transition * &state;
        cov = symmetrize(&transition * &cov * &transition_t + &noise);
    }

    Ok(ForecastResult::new(records, alpha))
}
