//! Seasonal ARIMA order specification.

use std::fmt;

use crate::error::{ForecastError, Result};

/// Largest non-seasonal AR order accepted.
pub const MAX_P: usize = 5;
/// Largest non-seasonal differencing order accepted.
pub const MAX_D: usize = 2;
/// Largest non-seasonal MA order accepted.
pub const MAX_Q: usize = 5;
/// Largest seasonal AR order accepted.
pub const MAX_SEASONAL_P: usize = 3;
/// Largest seasonal differencing order accepted.
pub const MAX_SEASONAL_D: usize = 2;
/// Largest seasonal MA order accepted.
pub const MAX_SEASONAL_Q: usize = 3;

/// Validated SARIMA(p,d,q)(P,D,Q,s) hyperparameters.
///
/// Instances can only be built through [`ModelSpec::new`], so every value in
/// circulation satisfies the order bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawModelSpec"))]
pub struct ModelSpec {
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_d: usize,
    seasonal_q: usize,
    period: usize,
}

impl ModelSpec {
    /// Create a specification from a non-seasonal `(p, d, q)` order and a
    /// seasonal `(P, D, Q, s)` order.
    ///
    /// A period of 1 means "no seasonality" and requires zero seasonal orders.
    ///
    /// # Example
    /// ```
    /// use cpi_forecast::models::sarima::ModelSpec;
    ///
    /// let spec = ModelSpec::new((1, 0, 1), (1, 0, 1, 12)).unwrap();
    /// assert_eq!(spec.to_string(), "SARIMA(1,0,1)(1,0,1,12)");
    /// assert!(ModelSpec::new((6, 0, 0), (0, 0, 0, 12)).is_err());
    /// ```
    pub fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Result<Self> {
        let (p, d, q) = order;
        let (seasonal_p, seasonal_d, seasonal_q, period) = seasonal;
        let spec = Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        };
        spec.check_bounds()?;
        Ok(spec)
    }

    /// Non-seasonal ARIMA(p,d,q).
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Result<Self> {
        Self::new((p, d, q), (0, 0, 0, 1))
    }

    fn check_bounds(&self) -> Result<()> {
        let checks = [
            ("p", self.p, MAX_P),
            ("d", self.d, MAX_D),
            ("q", self.q, MAX_Q),
            ("P", self.seasonal_p, MAX_SEASONAL_P),
            ("D", self.seasonal_d, MAX_SEASONAL_D),
            ("Q", self.seasonal_q, MAX_SEASONAL_Q),
        ];
        for (name, value, max) in checks {
            if value > max {
                return Err(ForecastError::InvalidSpec(format!(
                    "{} must be in [0, {}], got {}",
                    name, max, value
                )));
            }
        }
        if self.period == 0 {
            return Err(ForecastError::InvalidSpec(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        if self.period == 1 && self.num_seasonal_terms() > 0 {
            return Err(ForecastError::InvalidSpec(
                "seasonal orders require a period greater than 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the specification against a series of `n` observations.
    ///
    /// Fails when the total differencing order reaches `n / s`.
    pub fn validate_for(&self, n: usize) -> Result<()> {
        self.check_bounds()?;
        let total_d = self.d + self.seasonal_d;
        if total_d * self.period >= n {
            return Err(ForecastError::InvalidSpec(format!(
                "differencing order d + D = {} is too large for {} observations with period {}",
                total_d, n, self.period
            )));
        }
        Ok(())
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Seasonal AR order (P).
    pub fn seasonal_p(&self) -> usize {
        self.seasonal_p
    }

    /// Seasonal differencing order (D).
    pub fn seasonal_d(&self) -> usize {
        self.seasonal_d
    }

    /// Seasonal MA order (Q).
    pub fn seasonal_q(&self) -> usize {
        self.seasonal_q
    }

    /// Seasonal period (s).
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn seasonal_order(&self) -> (usize, usize, usize, usize) {
        (self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period)
    }

    pub fn is_seasonal(&self) -> bool {
        self.period > 1 && self.num_seasonal_terms() > 0
    }

    fn num_seasonal_terms(&self) -> usize {
        self.seasonal_p + self.seasonal_d + self.seasonal_q
    }

    /// Degree of the expanded AR polynomial φ(B)Φ(B^s).
    pub fn ar_order(&self) -> usize {
        self.p + self.period * self.seasonal_p
    }

    /// Degree of the expanded MA polynomial θ(B)Θ(B^s).
    pub fn ma_order(&self) -> usize {
        self.q + self.period * self.seasonal_q
    }

    /// Number of observations consumed by differencing (d + sD).
    pub fn differencing_lags(&self) -> usize {
        self.d + self.period * self.seasonal_d
    }

    /// Dimension of the ARMA state vector.
    pub fn state_dim(&self) -> usize {
        self.ar_order().max(self.ma_order() + 1)
    }

    /// Minimum number of differenced observations needed to fit.
    pub fn min_observations(&self) -> usize {
        self.ar_order() + self.ma_order() + 1
    }

    /// Number of estimated ARMA coefficients (p + q + P + Q).
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }
}

impl Default for ModelSpec {
    /// SARIMA(1,0,1)(1,0,1,12).
    fn default() -> Self {
        Self {
            p: 1,
            d: 0,
            q: 1,
            seasonal_p: 1,
            seasonal_d: 0,
            seasonal_q: 1,
            period: 12,
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.period == 1 {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        } else {
            write!(
                f,
                "SARIMA({},{},{})({},{},{},{})",
                self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
            )
        }
    }
}

/// Unchecked wire form of [`ModelSpec`]; deserialization goes through
/// [`ModelSpec::new`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, serde::Deserialize)]
struct RawModelSpec {
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_d: usize,
    seasonal_q: usize,
    period: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawModelSpec> for ModelSpec {
    type Error = ForecastError;

    fn try_from(raw: RawModelSpec) -> Result<Self> {
        ModelSpec::new(
            (raw.p, raw.d, raw.q),
            (raw.seasonal_p, raw.seasonal_d, raw.seasonal_q, raw.period),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    #[test]
    fn wire_form_is_validated() {
        let raw = RawModelSpec {
            p: 1,
            d: 0,
            q: 1,
            seasonal_p: 1,
            seasonal_d: 0,
            seasonal_q: 1,
            period: 12,
        };
        assert_eq!(ModelSpec::try_from(raw).unwrap(), ModelSpec::default());

        let too_many_lags = RawModelSpec { p: 9, ..raw };
        assert!(matches!(
            ModelSpec::try_from(too_many_lags),
            Err(ForecastError::InvalidSpec(_))
        ));
        let seasonal_without_period = RawModelSpec { period: 1, ..raw };
        assert!(ModelSpec::try_from(seasonal_without_period).is_err());
    }

    #[test]
    fn accepts_dashboard_periods() {
        for s in [3, 4, 6, 12] {
            let spec = ModelSpec::new((1, 1, 1), (1, 1, 1, s)).unwrap();
            assert_eq!(spec.period(), s);
            assert!(spec.is_seasonal());
        }
    }

    #[test]
    fn rejects_out_of_range_orders() {
        assert!(matches!(
            ModelSpec::new((6, 0, 0), (0, 0, 0, 12)),
            Err(ForecastError::InvalidSpec(_))
        ));
        assert!(ModelSpec::new((0, 3, 0), (0, 0, 0, 12)).is_err());
        assert!(ModelSpec::new((0, 0, 6), (0, 0, 0, 12)).is_err());
        assert!(ModelSpec::new((0, 0, 0), (4, 0, 0, 12)).is_err());
        assert!(ModelSpec::new((0, 0, 0), (0, 3, 0, 12)).is_err());
        assert!(ModelSpec::new((0, 0, 0), (0, 0, 4, 12)).is_err());
        assert!(ModelSpec::new((5, 2, 5), (3, 2, 3, 12)).is_ok());
    }

    #[test]
    fn rejects_bad_periods() {
        assert!(ModelSpec::new((1, 0, 0), (0, 0, 0, 0)).is_err());
        assert!(ModelSpec::new((1, 0, 0), (1, 0, 0, 1)).is_err());
        assert!(ModelSpec::new((1, 0, 0), (0, 0, 0, 1)).is_ok());
    }

    #[test]
    fn error_message_names_the_order() {
        let err = ModelSpec::new((7, 0, 0), (0, 0, 0, 12)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid model specification: p must be in [0, 5], got 7"
        );
    }

    #[test]
    fn validate_for_checks_differencing_against_length() {
        let spec = ModelSpec::new((0, 1, 0), (0, 1, 0, 12)).unwrap();
        // d + D = 2, n / s = 2
        assert!(matches!(
            spec.validate_for(24),
            Err(ForecastError::InvalidSpec(_))
        ));
        assert!(spec.validate_for(25).is_ok());
    }

    #[test]
    fn derived_orders() {
        let spec = ModelSpec::new((2, 1, 1), (1, 1, 2, 12)).unwrap();
        assert_eq!(spec.ar_order(), 14);
        assert_eq!(spec.ma_order(), 25);
        assert_eq!(spec.differencing_lags(), 13);
        assert_eq!(spec.state_dim(), 26);
        assert_eq!(spec.min_observations(), 40);
        assert_eq!(spec.num_coefficients(), 6);
    }

    #[test]
    fn large_spec_needs_many_observations() {
        let spec = ModelSpec::new((5, 0, 5), (3, 0, 3, 12)).unwrap();
        assert_eq!(spec.min_observations(), 83);
    }

    #[test]
    fn display_and_default() {
        assert_eq!(ModelSpec::default().to_string(), "SARIMA(1,0,1)(1,0,1,12)");
        assert_eq!(
            ModelSpec::non_seasonal(2, 1, 0).unwrap().to_string(),
            "ARIMA(2,1,0)"
        );
        assert_eq!(ModelSpec::default().order(), (1, 0, 1));
        assert_eq!(ModelSpec::default().seasonal_order(), (1, 0, 1, 12));
    }
}
