//! Sample autocorrelation and partial autocorrelation of residuals.

use crate::error::{ForecastError, Result};
use crate::utils::stats::{mean, quantile_normal};

fn check_lag(n: usize, max_lag: usize) -> Result<()> {
    if n == 0 {
        return Err(ForecastError::EmptyData);
    }
    if max_lag >= n {
        return Err(ForecastError::InvalidLag { max_lag, n });
    }
    Ok(())
}

/// Sample autocorrelation at lags `0..=max_lag`.
///
/// Uses the biased estimator (every lag divided by the full sum of squares),
/// which keeps the implied autocovariance matrix positive semi-definite.
/// Lag 0 is exactly 1; a constant series has zero autocorrelation elsewhere.
///
/// # Errors
/// [`ForecastError::InvalidLag`] when `max_lag >= residuals.len()`.
///
/// # Example
/// ```
/// use cpi_forecast::diagnostics::acf;
///
/// let values = acf(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0], 2).unwrap();
/// assert_eq!(values[0], 1.0);
/// assert!(values[1] < -0.8);
/// assert!(acf(&[1.0, 2.0], 2).is_err());
/// ```
pub fn acf(residuals: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = residuals.len();
    check_lag(n, max_lag)?;

    let m = mean(residuals);
    let centered: Vec<f64> = residuals.iter().map(|x| x - m).collect();
    let denominator: f64 = centered.iter().map(|x| x * x).sum();

    let mut values = Vec::with_capacity(max_lag + 1);
    values.push(1.0);
    for lag in 1..=max_lag {
        if denominator < 1e-12 {
            values.push(0.0);
            continue;
        }
        let numerator: f64 = centered
            .iter()
            .skip(lag)
            .zip(centered.iter())
            .map(|(a, b)| a * b)
            .sum();
        values.push(numerator / denominator);
    }
    Ok(values)
}

/// Sample partial autocorrelation at lags `1..=max_lag` (Durbin-Levinson).
///
/// If the recursion degenerates (the series is perfectly predictable from
/// its past), the remaining lags are NaN.
///
/// # Errors
/// [`ForecastError::InvalidLag`] when `max_lag >= residuals.len()`.
pub fn pacf(residuals: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let rho = acf(residuals, max_lag)?;
    Ok(durbin_levinson(&rho))
}

/// Partial autocorrelations from autocorrelations `rho[0..=L]`.
fn durbin_levinson(rho: &[f64]) -> Vec<f64> {
    let max_lag = rho.len().saturating_sub(1);
    let mut out = Vec::with_capacity(max_lag);
    let mut phi: Vec<f64> = Vec::with_capacity(max_lag);
    let mut error: f64 = 1.0;

    for k in 1..=max_lag {
        if error.abs() < 1e-12 {
            out.resize(max_lag, f64::NAN);
            break;
        }
        let num = rho[k] - (0..k - 1).map(|j| phi[j] * rho[k - 1 - j]).sum::<f64>();
        let reflection = num / error;

        let prev = phi.clone();
        for j in 0..k - 1 {
            phi[j] = prev[j] - reflection * prev[k - 2 - j];
        }
        phi.push(reflection);
        error *= 1.0 - reflection * reflection;
        out.push(reflection);
    }
    out
}

/// Half-width of the white-noise band for `n` residuals: `z(1 - α/2) / √n`.
///
/// At `alpha = 0.05` this is the familiar `1.96 / √n`.
pub fn significance_band(n: usize, alpha: f64) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    quantile_normal(1.0 - alpha / 2.0) / (n as f64).sqrt()
}
