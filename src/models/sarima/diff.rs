//! Differencing utilities for SARIMA models.

use super::spec::ModelSpec;

/// Apply ordinary differencing `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(series, d, 1)
}

/// Apply lag-`period` differencing `d` times.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Multiply two polynomials given by ascending coefficients.
pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0.0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Coefficients of δ(B) = (1 - B)^d (1 - B^s)^D, constant term first.
///
/// The result has `d + s·D + 1` entries and always starts with 1.
pub fn differencing_polynomial(spec: &ModelSpec) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..spec.d() {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    let mut seasonal = vec![0.0; spec.period() + 1];
    seasonal[0] = 1.0;
    seasonal[spec.period()] = -1.0;
    for _ in 0..spec.seasonal_d() {
        poly = poly_mul(&poly, &seasonal);
    }
    poly
}

/// Apply the full differencing filter of `spec`.
///
/// Equivalent to `d` ordinary differences followed by `D` seasonal ones; the
/// output is `d + s·D` observations shorter than the input.
pub fn apply_differencing(series: &[f64], spec: &ModelSpec) -> Vec<f64> {
    let poly = differencing_polynomial(spec);
    let lags = poly.len() - 1;
    if series.len() <= lags {
        return Vec::new();
    }
    (lags..series.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, &c)| c * series[t - k])
                .sum()
        })
        .collect()
}
