//! Reference-relative reduction records.

use serde::{Deserialize, Serialize};

/// Decomposition of one frame's displacement against the fixed reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionFrame {
    pub index: usize,
    /// actual - reference
    pub actual_displacement: f64,
    /// predicted - reference (actual reference, not the first prediction)
    pub predicted_displacement: f64,
    /// Same-signed overlap of the two displacements
    pub common: f64,
    /// Actual movement not cancelled by the prediction
    pub residual: f64,
    /// Predicted movement beyond the actual one
    pub overshoot: f64,
    /// `|actual| - residual`
    pub total_reduction: f64,
    /// `total_reduction / |actual| * 100`, 0 when the eye is at the reference
    pub efficiency_percent: f64,
}

impl ReductionFrame {
    pub fn improved(&self) -> bool {
        self.residual < self.actual_displacement.abs()
    }

    pub fn worsened(&self) -> bool {
        self.overshoot > 0.0
    }
}

/// Mean and maximum of one per-frame quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanMax {
    pub mean: f64,
    pub max: f64,
}

/// Reduction analysis over one axis of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionResult {
    /// Actual position of the first sample
    pub reference: f64,
    pub frames: Vec<ReductionFrame>,
    /// |actual - reference| (px)
    pub actual_displacement: MeanMax,
    /// |predicted - reference| (px)
    pub predicted_displacement: MeanMax,
    pub common: MeanMax,
    pub residual: MeanMax,
    pub overshoot: MeanMax,
    pub total_reduction: MeanMax,
    pub efficiency_percent: MeanMax,
    pub improved_frames: usize,
    pub worsened_frames: usize,
    pub improved_rate_percent: f64,
    pub worsened_rate_percent: f64,
}

/// Outcome of a reduction analysis.
///
/// Too-short traces are an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReductionOutcome {
    Complete(ReductionResult),
    InsufficientData { samples: usize, required: usize },
}

impl ReductionOutcome {
    pub fn result(&self) -> Option<&ReductionResult> {
        match self {
            Self::Complete(r) => Some(r),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
