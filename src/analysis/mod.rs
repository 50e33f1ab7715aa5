//! Trajectory and prediction analysis
//!
//! - `pattern`: amplitude / velocity / regularity classes, motion pattern,
//!   intensity, directionality and clinical notes
//! - `planar`: orientation, speed burden and per-axis frequency of two-axis traces
//! - `error_metrics`: actual vs. predicted accuracy and quality grades
//! - `reduction`: reference-relative common / residual / overshoot decomposition

pub mod error_metrics;
pub mod pattern;
pub mod planar;
pub mod reduction;

pub use error_metrics::{AxisSeries, ErrorMetricsEngine, LoggedErrors};
pub use pattern::PatternClassifier;
pub use planar::PlanarAnalyzer;
pub use reduction::ReductionAnalyzer;
