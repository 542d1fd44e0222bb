//! Error types for the cpi-forecast engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors raised by the forecasting engine.
///
/// Every variant is raised eagerly at the boundary of the offending call.
/// Optimizer non-convergence is not an error; it is reported through
/// [`FittedModel::converged`](crate::models::sarima::FittedModel::converged).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Model hyperparameters are out of range or inconsistent with the data.
    #[error("invalid model specification: {0}")]
    InvalidSpec(String),

    /// Not enough observations left after differencing for the requested orders.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Forecast horizon must be at least one step.
    #[error("invalid forecast horizon: {0} (must be at least 1)")]
    InvalidHorizon(usize),

    /// Requested lag bound is not smaller than the residual count.
    #[error("invalid lag: max lag {max_lag} must be smaller than the sample size {n}")]
    InvalidLag { max_lag: usize, n: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp ordering or monthly spacing is violated.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing or non-finite values detected.
    #[error("missing values detected in data")]
    MissingValues,

    /// A textual value filter could not be parsed.
    #[error("invalid value filter: {0}")]
    InvalidFilter(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
