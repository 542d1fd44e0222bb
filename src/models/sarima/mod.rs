//! Seasonal ARIMA models estimated by exact maximum likelihood.
//!
//! This module provides:
//! - [`ModelSpec`]: validated (p,d,q)(P,D,Q,s) orders
//! - [`ModelFitter`]: Kalman-filter likelihood maximisation
//! - [`FittedModel`]: estimates, information criteria and residuals
//! - [`forecast`]: horizon forecasts with analytic intervals

mod diff;
mod fitted;
mod fitter;
mod forecaster;
mod kalman;
mod params;
mod spec;
mod state_space;

pub use diff::{apply_differencing, difference, differencing_polynomial, seasonal_difference};
pub use fitted::FittedModel;
pub use fitter::{FitOptions, ModelFitter};
pub use forecaster::{forecast, DEFAULT_ALPHA};
pub use kalman::SIGMA2_FLOOR;
pub use params::SarimaParams;
pub use spec::ModelSpec;
