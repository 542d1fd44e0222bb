//! Forecasting models.

pub mod sarima;

pub use sarima::{FitOptions, FittedModel, ModelFitter, ModelSpec};
