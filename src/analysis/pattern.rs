//! Pattern Classifier
//!
//! Turns a position trace, its derived kinematics and the frequency /
//! waveform results into amplitude, velocity and regularity classes, a
//! motion pattern label, an intensity grade and directional statistics.
//!
//! All rules are pure functions from features to enums so each can be
//! exercised on hand-built feature sets.

use crate::config::{ClassificationThresholds, IntensityConfig};
use crate::processing::{stats, DerivedKinematics};
use crate::types::thresholds::{clinical_thresholds as ct, pattern_thresholds as pt};
use crate::types::{
    AmplitudeClass, ClinicalNote, DirectionPattern, Directionality, FrequencyResult,
    IntensityAssessment, IntensityGrade, KinematicSummary, MotionFeatures, MotionPattern,
    PatternResult, RegularityClass, VelocityClass, WaveformResult,
};

// ============================================================================
// Pattern Classifier
// ============================================================================

pub struct PatternClassifier<'a> {
    classification: &'a ClassificationThresholds,
    intensity: &'a IntensityConfig,
    fps: f64,
}

impl<'a> PatternClassifier<'a> {
    pub fn new(
        classification: &'a ClassificationThresholds,
        intensity: &'a IntensityConfig,
        fps: f64,
    ) -> Self {
        Self {
            classification,
            intensity,
            fps,
        }
    }

    /// Classify one axis.
    ///
    /// `position` is the raw trace; `kinematics` holds the velocity series
    /// already derived under the active preset.
    pub fn classify(
        &self,
        position: &[f64],
        kinematics: &DerivedKinematics,
        frequency: &FrequencyResult,
        waveform: WaveformResult,
    ) -> PatternResult {
        let features = motion_features(position, &kinematics.velocity, self.fps);
        let summary = kinematic_summary(position, &kinematics.speed, &kinematics.acceleration_magnitude);

        let amplitude_class = classify_amplitude(features.amplitude_range, self.classification);
        let velocity_class = classify_velocity(features.mean_speed, self.classification);
        let regularity_class =
            classify_regularity(features.coefficient_of_variation, self.classification);
        let pattern = classify_pattern(&features);

        let score = intensity_score(
            summary.displacement_range,
            summary.speed_mean,
            summary.acceleration_mean,
            waveform.complexity,
            summary.continuity,
            self.intensity,
        );
        let intensity = IntensityAssessment {
            score,
            grade: classify_intensity(score),
        };

        let directionality = directionality(
            position,
            &kinematics.velocity,
            self.classification.stationary_speed_px_s,
        );

        let clinical_notes = clinical_notes(
            score,
            frequency.dominant_frequency(),
            pattern,
            waveform.symmetry,
        );

        tracing::debug!(
            amplitude = %amplitude_class,
            velocity = %velocity_class,
            regularity = %regularity_class,
            pattern = %pattern,
            change_rate_hz = features.direction_change_rate,
            intensity = score,
            direction = %directionality.pattern,
            "Pattern classified"
        );

        PatternResult {
            amplitude_class,
            velocity_class,
            regularity_class,
            pattern,
            features,
            kinematics: summary,
            intensity,
            directionality,
            waveform,
            clinical_notes,
        }
    }
}

// ============================================================================
// Features
// ============================================================================

/// Features feeding the amplitude / velocity / regularity / pattern rules.
pub fn motion_features(position: &[f64], velocity: &[f64], fps: f64) -> MotionFeatures {
    let speed: Vec<f64> = velocity.iter().map(|v| v.abs()).collect();

    let mean_abs = stats::mean(&position.iter().map(|p| p.abs()).collect::<Vec<_>>());
    let coefficient_of_variation = if mean_abs > 0.0 {
        stats::population_std(position) / mean_abs
    } else {
        0.0
    };

    let duration = position.len() as f64 / fps;
    let direction_change_rate = if duration > 0.0 {
        stats::sign_change_points(velocity).len() as f64 / duration
    } else {
        0.0
    };

    let fast_threshold = stats::percentile(&speed, pt::FAST_PHASE_PERCENTILE);

    MotionFeatures {
        amplitude_range: stats::range(position),
        mean_speed: stats::mean(&speed),
        coefficient_of_variation,
        direction_change_rate,
        fast_phase_fraction: stats::fraction(&speed, |s| s > fast_threshold),
        speed_kurtosis: stats::kurtosis(&speed),
        speed_skewness: stats::skewness(&speed),
    }
}

pub fn kinematic_summary(position: &[f64], speed: &[f64], acceleration: &[f64]) -> KinematicSummary {
    let still = stats::percentile(speed, pt::STILL_SPEED_PERCENTILE);
    let continuity = if speed.is_empty() {
        0.0
    } else {
        1.0 - stats::fraction(speed, |s| s < still)
    };

    let speed_mean = stats::mean(speed);
    let high_speed = speed_mean + pt::HIGH_SPEED_SIGMA * stats::population_std(speed);

    KinematicSummary {
        displacement_range: stats::range(position),
        displacement_std: stats::population_std(position),
        displacement_rms: stats::rms_about_mean(position),
        speed_mean,
        speed_max: stats::max(speed),
        speed_p95: stats::percentile(speed, 95.0),
        acceleration_mean: stats::mean(acceleration),
        acceleration_max: stats::max(acceleration),
        acceleration_p95: stats::percentile(acceleration, 95.0),
        continuity,
        high_speed_ratio: stats::fraction(speed, |s| s > high_speed),
    }
}

// ============================================================================
// Classification Rules
// ============================================================================

pub fn classify_amplitude(range: f64, t: &ClassificationThresholds) -> AmplitudeClass {
    if range < t.amplitude_micro_px {
        AmplitudeClass::Micro
    } else if range < t.amplitude_small_px {
        AmplitudeClass::Small
    } else if range < t.amplitude_medium_px {
        AmplitudeClass::Medium
    } else {
        AmplitudeClass::Large
    }
}

pub fn classify_velocity(mean_speed: f64, t: &ClassificationThresholds) -> VelocityClass {
    if mean_speed < t.velocity_slow_px_s {
        VelocityClass::Slow
    } else if mean_speed < t.velocity_medium_px_s {
        VelocityClass::Medium
    } else {
        VelocityClass::Fast
    }
}

pub fn classify_regularity(cv: f64, t: &ClassificationThresholds) -> RegularityClass {
    if cv < t.regularity_regular_cv {
        RegularityClass::Regular
    } else if cv < t.regularity_semi_cv {
        RegularityClass::SemiRegular
    } else {
        RegularityClass::Irregular
    }
}

/// Ordered pattern rules; the first match wins.
pub fn classify_pattern(features: &MotionFeatures) -> MotionPattern {
    let rate = features.direction_change_rate;

    if rate > pt::OSCILLATING_CHANGE_RATE_HZ
        && features.fast_phase_fraction > pt::OSCILLATING_FAST_FRACTION
    {
        if features.speed_kurtosis > pt::JERK_SPEED_KURTOSIS
            && features.speed_skewness.abs() > pt::JERK_SPEED_SKEW
        {
            MotionPattern::Jerk
        } else {
            MotionPattern::Pendular
        }
    } else if rate > pt::MIXED_CHANGE_RATE_HZ {
        MotionPattern::Mixed
    } else if rate < pt::DRIFT_CHANGE_RATE_HZ {
        MotionPattern::Drift
    } else {
        MotionPattern::Irregular
    }
}

// ============================================================================
// Intensity
// ============================================================================

/// Weighted intensity score in [0, 10].
///
/// Each term is normalized by its ceiling and clamped to [0, 1] before
/// weighting.
pub fn intensity_score(
    displacement_range: f64,
    speed_mean: f64,
    acceleration_mean: f64,
    complexity: f64,
    continuity: f64,
    config: &IntensityConfig,
) -> f64 {
    fn term(value: f64, ceiling: f64) -> f64 {
        if ceiling <= 0.0 {
            return 0.0;
        }
        (value / ceiling).clamp(0.0, 1.0)
    }

    let w = &config.weights;
    let weighted = w.displacement * term(displacement_range, config.displacement_ceiling_px)
        + w.speed * term(speed_mean, config.speed_ceiling_px_s)
        + w.acceleration * term(acceleration_mean, config.acceleration_ceiling_px_s2)
        + w.complexity * term(complexity, config.complexity_ceiling)
        + w.continuity * continuity.clamp(0.0, 1.0);

    (weighted * 10.0).clamp(0.0, 10.0)
}

pub fn classify_intensity(score: f64) -> IntensityGrade {
    if score >= pt::INTENSITY_EXTREME {
        IntensityGrade::Extreme
    } else if score >= pt::INTENSITY_SEVERE {
        IntensityGrade::Severe
    } else if score >= pt::INTENSITY_MODERATE {
        IntensityGrade::Moderate
    } else if score >= pt::INTENSITY_MILD {
        IntensityGrade::Mild
    } else {
        IntensityGrade::Minimal
    }
}

// ============================================================================
// Directionality
// ============================================================================

pub fn directionality(position: &[f64], velocity: &[f64], stationary_speed: f64) -> Directionality {
    let rightward_fraction = stats::fraction(velocity, |v| v > 0.0);
    let leftward_fraction = stats::fraction(velocity, |v| v < 0.0);
    let stationary_fraction = stats::fraction(velocity, |v| v.abs() < stationary_speed);
    let persistence = direction_persistence(velocity);
    let bias = (rightward_fraction - leftward_fraction).abs();

    let center = stats::mean(position);
    let (rightward_extent, leftward_extent) = if position.is_empty() {
        (0.0, 0.0)
    } else {
        (stats::max(position) - center, center - stats::min(position))
    };

    Directionality {
        rightward_fraction,
        leftward_fraction,
        stationary_fraction,
        persistence,
        bias,
        rightward_extent,
        leftward_extent,
        pattern: classify_direction(rightward_fraction, leftward_fraction, bias, persistence),
    }
}

/// Mean same-sign run length over the trace length, clamped to [0, 1].
///
/// A trace without sign changes is one run and scores 1.0.
pub fn direction_persistence(velocity: &[f64]) -> f64 {
    let n = velocity.len();
    if n == 0 {
        return 0.0;
    }
    let changes = stats::sign_change_points(velocity);
    if changes.is_empty() {
        return 1.0;
    }

    // Runs end after each change point; n samples split into changes + 1 runs
    let runs = (changes.len() + 1) as f64;
    let mean_run = n as f64 / runs;
    (mean_run / n as f64).clamp(0.0, 1.0)
}

pub fn classify_direction(
    rightward: f64,
    leftward: f64,
    bias: f64,
    persistence: f64,
) -> DirectionPattern {
    if bias > pt::DIRECTION_BIAS {
        if rightward > leftward {
            DirectionPattern::RightwardBiased
        } else {
            DirectionPattern::LeftwardBiased
        }
    } else if persistence > pt::PERSISTENCE_SUSTAINED {
        DirectionPattern::BidirectionalSustained
    } else if persistence > pt::PERSISTENCE_INTERMITTENT {
        DirectionPattern::BidirectionalIntermittent
    } else {
        DirectionPattern::RapidAlternating
    }
}

// ============================================================================
// Clinical Notes
// ============================================================================

/// Ordered, non-diagnostic observations.
pub fn clinical_notes(
    intensity_score: f64,
    dominant_frequency: f64,
    pattern: MotionPattern,
    symmetry: f64,
) -> Vec<ClinicalNote> {
    let mut notes = Vec::new();

    notes.push(if intensity_score >= ct::HIGH_INTENSITY_SCORE {
        ClinicalNote::HighIntensity
    } else if intensity_score >= ct::MODERATE_INTENSITY_SCORE {
        ClinicalNote::ModerateIntensity
    } else {
        ClinicalNote::LowIntensity
    });

    let f = dominant_frequency;
    if (ct::TYPICAL_FREQUENCY_LOW_HZ..=ct::TYPICAL_FREQUENCY_HIGH_HZ).contains(&f) {
        notes.push(ClinicalNote::TypicalFrequency);
    } else if f > ct::HIGH_FREQUENCY_HZ {
        notes.push(ClinicalNote::HighFrequency);
    } else if f > 0.0 && f < ct::TYPICAL_FREQUENCY_LOW_HZ {
        notes.push(ClinicalNote::LowFrequency);
    }

    match pattern {
        MotionPattern::Jerk => notes.push(ClinicalNote::JerkPattern),
        MotionPattern::Pendular => notes.push(ClinicalNote::PendularPattern),
        _ => {}
    }

    if symmetry < ct::ASYMMETRY {
        notes.push(ClinicalNote::AsymmetricWaveform);
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(rate: f64, fast: f64, kurtosis: f64, skew: f64) -> MotionFeatures {
        MotionFeatures {
            amplitude_range: 40.0,
            mean_speed: 100.0,
            coefficient_of_variation: 0.1,
            direction_change_rate: rate,
            fast_phase_fraction: fast,
            speed_kurtosis: kurtosis,
            speed_skewness: skew,
        }
    }

    #[test]
    fn test_pattern_rules_in_order() {
        assert_eq!(classify_pattern(&features(4.0, 0.35, 1.2, 0.9)), MotionPattern::Jerk);
        assert_eq!(classify_pattern(&features(4.0, 0.35, -0.5, 0.9)), MotionPattern::Pendular);
        assert_eq!(classify_pattern(&features(4.0, 0.35, 1.2, 0.2)), MotionPattern::Pendular);
        // Fast share too low falls through to the rate rules
        assert_eq!(classify_pattern(&features(4.0, 0.2, 1.2, 0.9)), MotionPattern::Mixed);
        assert_eq!(classify_pattern(&features(2.0, 0.4, 0.0, 0.0)), MotionPattern::Mixed);
        assert_eq!(classify_pattern(&features(0.2, 0.4, 0.0, 0.0)), MotionPattern::Drift);
        assert_eq!(classify_pattern(&features(1.0, 0.4, 0.0, 0.0)), MotionPattern::Irregular);
    }

    #[test]
    fn test_amplitude_velocity_regularity_classes() {
        let t = ClassificationThresholds::default();
        assert_eq!(classify_amplitude(19.9, &t), AmplitudeClass::Micro);
        assert_eq!(classify_amplitude(20.0, &t), AmplitudeClass::Small);
        assert_eq!(classify_amplitude(99.0, &t), AmplitudeClass::Medium);
        assert_eq!(classify_amplitude(100.0, &t), AmplitudeClass::Large);

        assert_eq!(classify_velocity(10.0, &t), VelocityClass::Slow);
        assert_eq!(classify_velocity(150.0, &t), VelocityClass::Medium);
        assert_eq!(classify_velocity(200.0, &t), VelocityClass::Fast);

        assert_eq!(classify_regularity(0.1, &t), RegularityClass::Regular);
        assert_eq!(classify_regularity(0.45, &t), RegularityClass::SemiRegular);
        assert_eq!(classify_regularity(0.6, &t), RegularityClass::Irregular);
    }

    #[test]
    fn test_intensity_score_saturates() {
        let cfg = IntensityConfig::default();
        let max = intensity_score(1e6, 1e6, 1e6, 5.0, 1.0, &cfg);
        assert!((max - 10.0).abs() < 1e-9, "all terms saturated, got {max}");
        assert_eq!(intensity_score(0.0, 0.0, 0.0, 0.0, 0.0, &cfg), 0.0);

        // Half of every ceiling, full continuity: 10 * (0.85 * 0.5 + 0.15)
        let half = intensity_score(50.0, 250.0, 1000.0, 0.5, 1.0, &cfg);
        assert!((half - 5.75).abs() < 1e-9, "got {half}");
    }

    #[test]
    fn test_intensity_grades() {
        assert_eq!(classify_intensity(8.0), IntensityGrade::Extreme);
        assert_eq!(classify_intensity(7.9), IntensityGrade::Severe);
        assert_eq!(classify_intensity(4.0), IntensityGrade::Moderate);
        assert_eq!(classify_intensity(2.0), IntensityGrade::Mild);
        assert_eq!(classify_intensity(1.99), IntensityGrade::Minimal);
    }

    #[test]
    fn test_persistence() {
        assert_eq!(direction_persistence(&[1.0, 2.0, 3.0, 4.0]), 1.0);
        // Alternating every sample: n runs of length 1
        let alternating = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        assert!((direction_persistence(&alternating) - 0.1).abs() < 1e-12);
        // Two runs of five
        let two = [1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0, -1.0];
        assert!((direction_persistence(&two) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_direction_pattern() {
        assert_eq!(classify_direction(0.8, 0.2, 0.6, 0.1), DirectionPattern::RightwardBiased);
        assert_eq!(classify_direction(0.2, 0.8, 0.6, 0.1), DirectionPattern::LeftwardBiased);
        assert_eq!(classify_direction(0.5, 0.5, 0.0, 0.8), DirectionPattern::BidirectionalSustained);
        assert_eq!(classify_direction(0.5, 0.5, 0.0, 0.5), DirectionPattern::BidirectionalIntermittent);
        assert_eq!(classify_direction(0.5, 0.5, 0.0, 0.1), DirectionPattern::RapidAlternating);
    }

    #[test]
    fn test_directionality_extents() {
        let position = [0.0, 10.0, 20.0, 10.0, 0.0];
        let velocity = [10.0, 10.0, 0.0, -10.0, -10.0];
        let d = directionality(&position, &velocity, 5.0);
        assert!((d.rightward_fraction - 0.4).abs() < 1e-12);
        assert!((d.leftward_fraction - 0.4).abs() < 1e-12);
        assert!((d.stationary_fraction - 0.2).abs() < 1e-12);
        assert!((d.rightward_extent - 12.0).abs() < 1e-12);
        assert!((d.leftward_extent - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_clinical_notes() {
        let notes = clinical_notes(7.5, 3.0, MotionPattern::Jerk, 0.3);
        assert_eq!(
            notes,
            vec![
                ClinicalNote::HighIntensity,
                ClinicalNote::TypicalFrequency,
                ClinicalNote::JerkPattern,
                ClinicalNote::AsymmetricWaveform,
            ]
        );

        // No frequency at all adds no frequency note
        let quiet = clinical_notes(1.0, 0.0, MotionPattern::Drift, 0.9);
        assert_eq!(quiet, vec![ClinicalNote::LowIntensity]);

        let fast = clinical_notes(5.0, 9.0, MotionPattern::Pendular, 0.9);
        assert!(fast.contains(&ClinicalNote::HighFrequency));
        assert!(fast.contains(&ClinicalNote::PendularPattern));
    }

    #[test]
    fn test_motion_features_of_constant_trace() {
        let position = [100.0; 30];
        let velocity = [0.0; 30];
        let f = motion_features(&position, &velocity, 60.0);
        assert_eq!(f.amplitude_range, 0.0);
        assert_eq!(f.direction_change_rate, 0.0);
        assert_eq!(f.coefficient_of_variation, 0.0);
        assert_eq!(classify_pattern(&f), MotionPattern::Drift);
    }
}
