//! Numerical utilities shared by the model and diagnostics code.

pub mod optimization;
pub mod stats;

pub use optimization::{bfgs, BfgsConfig, BfgsResult, Termination};
pub use stats::{chi_squared_sf, quantile_normal};
