//! Two-axis motion: orientation, speed burden, regularity and per-axis frequency.

use crate::config::{ClassificationThresholds, FrequencyConfig};
use crate::processing::{autocorrelation, find_peaks, stats, DerivedKinematics, FrequencyAnalyzer, PeakCriteria};
use crate::types::thresholds::planar_thresholds as pt;
use crate::types::{
    AxisFrequency, AxisFrequencyClass, Orientation, PlanarAnalysis, PlanarMotion, SpeedBurden,
};

/// Analysis of a trace that carries both x and y.
pub struct PlanarAnalyzer<'a> {
    classification: &'a ClassificationThresholds,
    frequency: &'a FrequencyConfig,
    fps: f64,
}

impl<'a> PlanarAnalyzer<'a> {
    pub fn new(
        classification: &'a ClassificationThresholds,
        frequency: &'a FrequencyConfig,
        fps: f64,
    ) -> Self {
        Self {
            classification,
            frequency,
            fps,
        }
    }

    /// `kx` / `ky` are the per-axis kinematics derived under the active preset.
    pub fn analyze(
        &self,
        x: &[f64],
        y: &[f64],
        kx: &DerivedKinematics,
        ky: &DerivedKinematics,
    ) -> PlanarAnalysis {
        let speed: Vec<f64> = kx
            .velocity
            .iter()
            .zip(&ky.velocity)
            .map(|(vx, vy)| vx.hypot(*vy))
            .collect();
        let acceleration: Vec<f64> = kx
            .acceleration
            .iter()
            .zip(&ky.acceleration)
            .map(|(ax, ay)| ax.hypot(*ay))
            .collect();

        let x_range = stats::range(x);
        let y_range = stats::range(y);
        let x_amplitude_std = stats::population_std(x);
        let y_amplitude_std = stats::population_std(y);

        let high_speed_ratio = stats::fraction(&speed, |s| s > self.classification.high_speed_px_s);
        let high_accel_ratio =
            stats::fraction(&acceleration, |a| a > self.classification.high_accel_px_s2);

        let motion = PlanarMotion {
            orientation: classify_orientation(x_range, y_range),
            x_range,
            y_range,
            x_amplitude_std,
            y_amplitude_std,
            total_amplitude: x_amplitude_std.hypot(y_amplitude_std),
            high_speed_ratio,
            high_accel_ratio,
            speed_burden: classify_speed_burden(high_speed_ratio, high_accel_ratio),
            regularity_period_secs: regularity_period(x, self.fps),
        };

        let analyzer = FrequencyAnalyzer::new(
            &self.frequency.planar,
            self.fps,
            self.frequency.stability_window_secs,
            self.frequency.min_stability_window,
        );
        let axis = |trace: &[f64]| {
            let peak = analyzer.dominant_peak(trace);
            AxisFrequency {
                peak,
                class: AxisFrequencyClass::from_frequency(peak.map(|p| p.frequency)),
            }
        };
        let x_frequency = axis(x);
        let y_frequency = axis(y);

        tracing::debug!(
            orientation = %motion.orientation,
            burden = %motion.speed_burden,
            x_hz = x_frequency.peak.map_or(0.0, |p| p.frequency),
            y_hz = y_frequency.peak.map_or(0.0, |p| p.frequency),
            "Planar analysis complete"
        );

        PlanarAnalysis {
            motion,
            x_frequency,
            y_frequency,
        }
    }
}

/// Dominant axis from the peak-to-peak ranges.
pub fn classify_orientation(x_range: f64, y_range: f64) -> Orientation {
    let larger = x_range.max(y_range);
    if larger <= 0.0 {
        Orientation::Static
    } else if x_range > pt::AXIS_DOMINANCE_RATIO * y_range {
        Orientation::Horizontal
    } else if y_range > pt::AXIS_DOMINANCE_RATIO * x_range {
        Orientation::Vertical
    } else if (x_range - y_range).abs() / larger < pt::ROTARY_RELATIVE_DIFFERENCE {
        Orientation::RotaryOrMixed
    } else {
        Orientation::Oblique
    }
}

pub fn classify_speed_burden(high_speed_ratio: f64, high_accel_ratio: f64) -> SpeedBurden {
    if high_speed_ratio > pt::SEVERE_HIGH_SPEED_RATIO || high_accel_ratio > pt::SEVERE_HIGH_ACCEL_RATIO {
        SpeedBurden::Severe
    } else if high_speed_ratio > pt::MODERATE_HIGH_SPEED_RATIO
        || high_accel_ratio > pt::MODERATE_HIGH_ACCEL_RATIO
    {
        SpeedBurden::Moderate
    } else {
        SpeedBurden::Mild
    }
}

/// Period (s) of the first autocorrelation peak within one second of lag.
///
/// Needs more than 60 samples and more than one second of data.
pub fn regularity_period(signal: &[f64], fps: f64) -> Option<f64> {
    let n = signal.len();
    let lag_limit = fps as usize;
    if n <= pt::REGULARITY_MIN_SAMPLES || n <= lag_limit {
        return None;
    }

    let corr = autocorrelation(signal, lag_limit);
    if corr.len() < 2 {
        return None;
    }

    let criteria = PeakCriteria {
        height: Some(pt::REGULARITY_PEAK_HEIGHT),
        ..PeakCriteria::default()
    };
    find_peaks(&corr[1..], &criteria)
        .first()
        .map(|&p| (p + 1) as f64 / fps)
}
