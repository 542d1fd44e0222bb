//! # cpi-forecast
//!
//! Seasonal ARIMA forecasting engine for monthly consumer price index series.
//!
//! Fits SARIMA(p,d,q)(P,D,Q,s) models by exact Gaussian maximum likelihood
//! over a Kalman-filter state-space form, produces horizon forecasts with
//! analytic confidence intervals, and computes residual diagnostics (ACF,
//! PACF, Q-Q data, Ljung-Box and Jarque-Bera tests).

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod background;
pub mod cache;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::background::{spawn_cached, spawn_fit, FitHandle, FitStatus};
    pub use crate::cache::{FitCache, FitKey};
    pub use crate::core::{ForecastRecord, ForecastResult, TimeSeries, ValueFilter};
    pub use crate::diagnostics::{DiagnosticsConfig, DiagnosticsEngine, DiagnosticsResult};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::sarima::{
        FitOptions, FittedModel, ModelFitter, ModelSpec, DEFAULT_ALPHA,
    };
}
