//! Per-recording result records handed to presentation code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AxisFrequencyClass, ErrorMetrics, FrequencyResult, InputLayout, PatternResult, PlanarMotion,
    ReductionOutcome, SpectralPeak,
};

/// Dominant in-band peak of one axis of a two-axis trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisFrequency {
    pub peak: Option<SpectralPeak>,
    pub class: AxisFrequencyClass,
}

/// Two-axis additions to the trajectory analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarAnalysis {
    pub motion: PlanarMotion,
    pub x_frequency: AxisFrequency,
    pub y_frequency: AxisFrequency,
}

/// Oscillation characterization of the actual (x) gaze trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryReport {
    pub frequency: FrequencyResult,
    pub pattern: PatternResult,
    pub planar: Option<PlanarAnalysis>,
}

/// Predictor accuracy and reduction analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub errors: ErrorMetrics,
    pub reduction_x: ReductionOutcome,
    pub reduction_y: Option<ReductionOutcome>,
}

/// Complete analysis of one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub source: String,
    pub layout: InputLayout,
    pub fps: f64,
    pub samples: usize,
    pub dropped_rows: usize,
    pub duration_secs: f64,
    /// Frequency preset that was applied ("planar" or "horizontal")
    pub preset: String,
    pub generated_at: DateTime<Utc>,
    pub trajectory: TrajectoryReport,
    pub prediction: PredictionReport,
}
