//! Reduction Analyzer
//!
//! Decomposes each frame's displacement from a fixed reference (the first
//! sample's actual position) into the part the prediction covers, the part
//! it misses and the part it overshoots.

use crate::processing::stats;
use crate::types::{MeanMax, ReductionFrame, ReductionOutcome, ReductionResult};

/// Minimum number of samples for a reduction analysis.
pub const MIN_REDUCTION_SAMPLES: usize = 2;

pub struct ReductionAnalyzer;

impl ReductionAnalyzer {
    /// Analyze one axis.
    ///
    /// Both displacements are taken against the actual position of the
    /// first sample, so a perfect prediction leaves no residual.
    pub fn analyze(actual: &[f64], predicted: &[f64]) -> ReductionOutcome {
        let n = actual.len().min(predicted.len());
        if n < MIN_REDUCTION_SAMPLES {
            tracing::debug!(samples = n, "Too few samples for reduction analysis");
            return ReductionOutcome::InsufficientData {
                samples: n,
                required: MIN_REDUCTION_SAMPLES,
            };
        }

        let reference = actual[0];
        let frames: Vec<ReductionFrame> = actual[..n]
            .iter()
            .zip(&predicted[..n])
            .enumerate()
            .map(|(index, (&a, &p))| decompose(index, a - reference, p - reference))
            .collect();

        let improved_frames = frames.iter().filter(|f| f.improved()).count();
        let worsened_frames = frames.iter().filter(|f| f.worsened()).count();

        let result = ReductionResult {
            reference,
            actual_displacement: mean_max(&frames, |f| f.actual_displacement.abs()),
            predicted_displacement: mean_max(&frames, |f| f.predicted_displacement.abs()),
            common: mean_max(&frames, |f| f.common),
            residual: mean_max(&frames, |f| f.residual),
            overshoot: mean_max(&frames, |f| f.overshoot),
            total_reduction: mean_max(&frames, |f| f.total_reduction),
            efficiency_percent: mean_max(&frames, |f| f.efficiency_percent),
            improved_frames,
            worsened_frames,
            improved_rate_percent: improved_frames as f64 / n as f64 * 100.0,
            worsened_rate_percent: worsened_frames as f64 / n as f64 * 100.0,
            frames,
        };

        tracing::debug!(
            reference = reference,
            mean_efficiency = result.efficiency_percent.mean,
            improved = improved_frames,
            worsened = worsened_frames,
            "Reduction analysis complete"
        );

        ReductionOutcome::Complete(result)
    }
}

/// Split one frame's displacements.
///
/// Opposite-signed displacements share nothing; a zero displacement shares
/// nothing with anything.
pub fn decompose(index: usize, actual_displacement: f64, predicted_displacement: f64) -> ReductionFrame {
    let a = actual_displacement.abs();
    let p = predicted_displacement.abs();

    let same_sign = stats::sign(actual_displacement) == stats::sign(predicted_displacement);
    let common = if same_sign { a.min(p) } else { 0.0 };
    let residual = (a - common).max(0.0);
    let overshoot = (p - a).max(0.0);
    let total_reduction = a - residual;
    let efficiency_percent = if a > 0.0 { total_reduction / a * 100.0 } else { 0.0 };

    ReductionFrame {
        index,
        actual_displacement,
        predicted_displacement,
        common,
        residual,
        overshoot,
        total_reduction,
        efficiency_percent,
    }
}

fn mean_max<F>(frames: &[ReductionFrame], field: F) -> MeanMax
where
    F: Fn(&ReductionFrame) -> f64,
{
    let values: Vec<f64> = frames.iter().map(field).collect();
    MeanMax {
        mean: stats::mean(&values),
        max: stats::max(&values),
    }
}
