//! Plain-text rendering of a `SessionReport`.

use std::fmt::Write;

use crate::types::{
    ErrorMetrics, FrequencyResult, PatternResult, PlanarAnalysis, ReductionOutcome, SessionReport,
};

/// Render a full session report for the terminal.
pub fn format_session_report(report: &SessionReport) -> String {
    let mut output = String::new();
    output.push_str("Nystagmus Gaze Analysis\n");
    output.push_str("=======================\n");
    output.push_str(&format!("Source: {}\n", report.source));
    output.push_str(&format!(
        "Layout: {} | {} samples ({} dropped) | {:.1} s at {:.0} fps | preset: {}\n",
        report.layout,
        report.samples,
        report.dropped_rows,
        report.duration_secs,
        report.fps,
        report.preset,
    ));
    output.push_str(&format!(
        "Generated: {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&format_frequency(&report.trajectory.frequency));
    output.push('\n');
    output.push_str(&format_pattern(&report.trajectory.pattern));
    if let Some(planar) = &report.trajectory.planar {
        output.push('\n');
        output.push_str(&format_planar(planar));
    }
    output.push('\n');
    output.push_str(&format_errors(&report.prediction.errors));
    output.push('\n');
    output.push_str(&format_reduction("X", &report.prediction.reduction_x));
    if let Some(y) = &report.prediction.reduction_y {
        output.push_str(&format_reduction("Y", y));
    }
    output
}

pub fn format_frequency(result: &FrequencyResult) -> String {
    let mut output = String::new();
    output.push_str("Frequency\n---------\n");

    match result.dominant {
        Some(peak) => {
            let _ = writeln!(
                output,
                "Dominant: {:.2} Hz (power {:.1}) - {}",
                peak.frequency, peak.power, result.category
            );
        }
        None => {
            let _ = writeln!(output, "Dominant: {}", result.category);
        }
    }
    let _ = writeln!(
        output,
        "Stability: {:.3} | resolution {:.3} Hz",
        result.stability, result.resolution_hz
    );

    for h in &result.harmonics {
        let _ = writeln!(output, "- Harmonic x{}: {:.2} Hz (power {:.1})", h.order, h.frequency, h.power);
    }
    for p in &result.secondary {
        let _ = writeln!(output, "- Secondary: {:.2} Hz (power {:.1})", p.frequency, p.power);
    }

    output.push_str("Band energy:\n");
    for band in &result.bands {
        let marker = if result.dominant_band.as_deref() == Some(band.name.as_str()) {
            " <"
        } else {
            ""
        };
        let _ = writeln!(output, "- {:>8}: {:5.1}%{}", band.name, band.share_percent, marker);
    }
    output
}

pub fn format_pattern(result: &PatternResult) -> String {
    let mut output = String::new();
    output.push_str("Pattern\n-------\n");
    let _ = writeln!(
        output,
        "Classes: {} / {} / {}",
        result.amplitude_class, result.velocity_class, result.regularity_class
    );
    let _ = writeln!(
        output,
        "Pattern: {} ({})",
        result.pattern,
        result.pattern.description()
    );
    let f = &result.features;
    let _ = writeln!(
        output,
        "Range {:.1} px | mean speed {:.1} px/s | CV {:.3} | {:.2} direction changes/s | fast phase {:.1}%",
        f.amplitude_range,
        f.mean_speed,
        f.coefficient_of_variation,
        f.direction_change_rate,
        f.fast_phase_fraction * 100.0,
    );

    let k = &result.kinematics;
    let _ = writeln!(
        output,
        "Speed mean/max/p95: {:.1} / {:.1} / {:.1} px/s | accel mean/max/p95: {:.1} / {:.1} / {:.1} px/s^2",
        k.speed_mean, k.speed_max, k.speed_p95, k.acceleration_mean, k.acceleration_max, k.acceleration_p95,
    );
    let _ = writeln!(
        output,
        "Intensity: {:.2}/10 ({}) | continuity {:.1}%",
        result.intensity.score,
        result.intensity.grade,
        k.continuity * 100.0
    );

    let d = &result.directionality;
    let _ = writeln!(
        output,
        "Direction: {} | right {:.1}% left {:.1}% still {:.1}% | persistence {:.3}",
        d.pattern,
        d.rightward_fraction * 100.0,
        d.leftward_fraction * 100.0,
        d.stationary_fraction * 100.0,
        d.persistence,
    );

    let w = &result.waveform;
    let _ = writeln!(
        output,
        "Waveform: {} | symmetry {:.3} smoothness {:.3} periodicity {:.3} ApEn {:.3}",
        w.waveform_type, w.symmetry, w.smoothness, w.periodicity, w.complexity,
    );

    if !result.clinical_notes.is_empty() {
        output.push_str("Notes:\n");
        for note in &result.clinical_notes {
            let _ = writeln!(output, "- {note}");
        }
    }
    output
}

pub fn format_planar(planar: &PlanarAnalysis) -> String {
    let m = &planar.motion;
    let mut output = String::new();
    output.push_str("Two-axis motion\n---------------\n");
    let _ = writeln!(
        output,
        "Orientation: {} (x range {:.1} px, y range {:.1} px)",
        m.orientation, m.x_range, m.y_range
    );
    let _ = writeln!(
        output,
        "Speed burden: {} ({:.1}% > speed limit, {:.1}% > accel limit)",
        m.speed_burden,
        m.high_speed_ratio * 100.0,
        m.high_accel_ratio * 100.0,
    );
    let _ = writeln!(
        output,
        "Amplitude std x/y/total: {:.1} / {:.1} / {:.1} px",
        m.x_amplitude_std, m.y_amplitude_std, m.total_amplitude
    );
    match m.regularity_period_secs {
        Some(p) if p > 0.0 => {
            let _ = writeln!(output, "Regular period: {:.2} s ({:.2} Hz)", p, 1.0 / p);
        }
        _ => output.push_str("Regular period: none\n"),
    }
    for (axis, freq) in [("X", &planar.x_frequency), ("Y", &planar.y_frequency)] {
        match freq.peak {
            Some(peak) => {
                let _ = writeln!(output, "{axis} axis: {:.2} Hz ({})", peak.frequency, freq.class);
            }
            None => {
                let _ = writeln!(output, "{axis} axis: {}", freq.class);
            }
        }
    }
    output
}

pub fn format_errors(metrics: &ErrorMetrics) -> String {
    let mut output = String::new();
    output.push_str("Prediction error\n----------------\n");
    let e = &metrics.euclidean;
    let _ = writeln!(
        output,
        "Error: mean {:.2} px, median {:.2}, min {:.2}, max {:.2}, std {:.2} (CI95 +/-{:.2})",
        e.mean, e.median, e.min, e.max, e.std, e.ci95_half_width
    );
    let _ = writeln!(
        output,
        "RMSE {:.2} px | NRMSE {:.3} | visual angle {:.3} deg mean, {:.3} deg max",
        metrics.rmse, metrics.nrmse, metrics.visual_angle.mean_deg, metrics.visual_angle.max_deg
    );

    let mut axes = vec![("X", &metrics.x)];
    if let Some(y) = &metrics.y {
        axes.push(("Y", y));
    }
    for (name, s) in axes {
        let _ = writeln!(
            output,
            "- {name}: bias {:+.2}, MAE {:.2}, r {:.3} (p {:.2e}), R^2 {:.3}, NRMSE {:.3}",
            s.bias, s.mae, s.correlation, s.correlation_p_value, s.r_squared, s.nrmse
        );
    }

    let bands: Vec<String> = metrics
        .precision
        .iter()
        .map(|b| format!("{:.0}px {:.1}%", b.threshold_px, b.percent))
        .collect();
    let _ = writeln!(output, "Within: {}", bands.join(", "));
    let _ = writeln!(
        output,
        "Prediction step {:.2} px, jitter {:.2} px | path length {:.0} vs {:.0} px",
        metrics.smoothness.mean_step,
        metrics.smoothness.jitter,
        metrics.trajectory.actual_path_length,
        metrics.trajectory.predicted_path_length,
    );
    if let Some(logged) = &metrics.logged {
        let _ = writeln!(output, "Logged error: mean {:.2}, max {:.2}", logged.mean, logged.max);
    }
    if let Some(lx) = &metrics.logged_x {
        let _ = writeln!(
            output,
            "Logged X error: bias {:+.2}, mean |e| {:.2}, max |e| {:.2}, off positions by {:.2} px",
            lx.bias, lx.mean_abs, lx.max_abs, lx.agreement_px
        );
    }

    let q = &metrics.quality;
    let _ = writeln!(
        output,
        "Quality: {} ({}/5) | NRMSE grade {} | mean error grade {}",
        q.overall, q.composite_score, q.nrmse_grade, q.mean_error_grade
    );
    output
}

pub fn format_reduction(axis: &str, outcome: &ReductionOutcome) -> String {
    match outcome {
        ReductionOutcome::InsufficientData { samples, required } => format!(
            "Reduction {axis}: insufficient data ({samples} samples, need {required})\n"
        ),
        ReductionOutcome::Complete(r) => format!(
            "Reduction {axis} (reference {:.1} px): displacement {:.2} actual vs {:.2} predicted px mean | \
             efficiency {:.1}% | residual {:.2} px mean | overshoot {:.2} px mean | \
             improved {:.1}% worsened {:.1}%\n",
            r.reference,
            r.actual_displacement.mean,
            r.predicted_displacement.mean,
            r.efficiency_percent.mean,
            r.residual.mean,
            r.overshoot.mean,
            r.improved_rate_percent,
            r.worsened_rate_percent,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_reduction_line() {
        let text = format_reduction(
            "X",
            &ReductionOutcome::InsufficientData {
                samples: 1,
                required: 2,
            },
        );
        assert!(text.contains("insufficient data"), "got: {text}");
    }

    #[test]
    fn test_empty_frequency_section() {
        let text = format_frequency(&FrequencyResult::empty(0.5));
        assert!(text.contains("no distinct frequency"), "got: {text}");
    }
}
