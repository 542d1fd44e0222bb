//! Core data structures: the monthly series and forecast results.

mod forecast;
mod time_series;

pub use forecast::{ForecastRecord, ForecastResult, PriceDirection};
pub use time_series::{Observation, SeriesFingerprint, TimeSeries, ValueFilter, YearlySummary};
