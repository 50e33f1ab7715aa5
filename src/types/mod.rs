//! Shared data structures for gaze-trace analysis
//!
//! This module defines the records that flow through the pipeline:
//! - Input: RawGazeRow, GazeSample, GazeTrace
//! - Frequency: FrequencyResult (dominant peak, harmonics, band energy)
//! - Pattern: PatternResult (classes, intensity, directionality, waveform)
//! - Metrics: ErrorMetrics (pointwise and aggregate predictor error)
//! - Reduction: ReductionOutcome (common / residual / overshoot per frame)
//! - Report: TrajectoryReport, PredictionReport, SessionReport

mod gaze;
mod frequency;
mod pattern;
mod metrics;
mod reduction;
mod report;
pub mod thresholds;

pub use gaze::*;
pub use frequency::*;
pub use pattern::*;
pub use metrics::*;
pub use reduction::*;
pub use report::*;
