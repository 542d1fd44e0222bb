//! Residual diagnostics: ACF, PACF, Q-Q data and white-noise tests.

mod autocorrelation;
mod engine;
mod normality;

pub use autocorrelation::{acf, pacf, significance_band};
pub use engine::{DiagnosticsConfig, DiagnosticsEngine, DiagnosticsResult, DEFAULT_MAX_LAG};
pub use normality::{jarque_bera, qq_plot, JarqueBeraResult, QqPlot, ReferenceLine};
pub use residual_tests::{ljung_box, LjungBoxResult};
