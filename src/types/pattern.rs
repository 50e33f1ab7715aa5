//! Classification records for oscillation shape, pattern and intensity.

use serde::{Deserialize, Serialize};

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let label = match self {
                    $(Self::$variant => $label),+
                };
                write!(f, "{label}")
            }
        }
    };
}

labelled_enum!(
    /// Peak-to-peak position range class.
    AmplitudeClass {
        Micro => "micro-amplitude",
        Small => "small-amplitude",
        Medium => "medium-amplitude",
        Large => "large-amplitude",
    }
);

labelled_enum!(
    /// Mean eye speed class.
    VelocityClass {
        Slow => "slow",
        Medium => "medium-speed",
        Fast => "fast",
    }
);

labelled_enum!(
    /// Position coefficient-of-variation class.
    RegularityClass {
        Regular => "regular",
        SemiRegular => "semi-regular",
        Irregular => "irregular",
    }
);

labelled_enum!(
    /// Overall motion pattern.
    MotionPattern {
        Jerk => "jerk (impulsive)",
        Pendular => "pendular",
        Mixed => "mixed",
        Drift => "drift",
        Irregular => "irregular",
    }
);

impl MotionPattern {
    pub fn description(self) -> &'static str {
        match self {
            Self::Jerk => "slow drift followed by a fast corrective phase",
            Self::Pendular => "frequent direction changes at similar speed in both directions",
            Self::Mixed => "moderate direction-change rate mixing slow and fast phases",
            Self::Drift => "slow, sustained movement with few direction changes",
            Self::Irregular => "no consistent oscillation pattern",
        }
    }
}

labelled_enum!(
    /// Five ordered intensity levels.
    IntensityGrade {
        Minimal => "minimal",
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
        Extreme => "extreme",
    }
);

labelled_enum!(
    /// Directional behaviour of the velocity trace.
    DirectionPattern {
        RightwardBiased => "rightward-biased",
        LeftwardBiased => "leftward-biased",
        BidirectionalSustained => "bidirectional-sustained",
        BidirectionalIntermittent => "bidirectional-intermittent",
        RapidAlternating => "rapid-alternating",
    }
);

labelled_enum!(
    /// Waveform shape from periodicity, smoothness and symmetry.
    WaveformType {
        RegularSinusoidal => "regular sinusoidal",
        RegularAsymmetric => "regular asymmetric",
        SemiRegularSmooth => "semi-regular smooth",
        SemiRegularJagged => "semi-regular jagged",
        IrregularSmooth => "irregular smooth",
        IrregularNoisy => "irregular noisy",
    }
);

labelled_enum!(
    /// Dominant direction of a two-axis trace.
    Orientation {
        Static => "static",
        Horizontal => "horizontal",
        Vertical => "vertical",
        RotaryOrMixed => "rotary/mixed",
        Oblique => "oblique",
    }
);

labelled_enum!(
    /// Two-axis grade from the share of high-speed and high-acceleration samples.
    SpeedBurden {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
);

labelled_enum!(
    /// Non-diagnostic observations derived from the analysis.
    ClinicalNote {
        HighIntensity => "high-intensity nystagmus, may affect visual function",
        ModerateIntensity => "moderate-intensity nystagmus, warrants attention",
        LowIntensity => "low-intensity nystagmus, relatively mild",
        TypicalFrequency => "frequency within the typical nystagmus range (1-5 Hz)",
        HighFrequency => "high-frequency nystagmus (>8 Hz), may suggest a central origin",
        LowFrequency => "low-frequency nystagmus (<1 Hz), may suggest vestibular involvement",
        JerkPattern => "jerk pattern, suggests vestibular system involvement",
        PendularPattern => "pendular pattern, may be congenital or acquired",
        AsymmetricWaveform => "asymmetric waveform, needs further evaluation",
    }
);

/// Shape descriptors of a position trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformResult {
    /// `1 / (1 + |skew|)`, 1.0 for a symmetric signal
    pub symmetry: f64,
    /// `1 / (1 + var(second difference))`
    pub smoothness: f64,
    /// First significant autocorrelation peak, 0 when none
    pub periodicity: f64,
    /// Approximate entropy
    pub complexity: f64,
    pub positive_peaks: usize,
    pub negative_peaks: usize,
    /// Mean height of positive extrema above the trace mean, 0 when none
    pub mean_positive_peak: f64,
    /// Mean depth of negative extrema below the trace mean, 0 when none
    pub mean_negative_peak: f64,
    pub waveform_type: WaveformType,
}

/// Features feeding the pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionFeatures {
    /// max - min of position (px)
    pub amplitude_range: f64,
    /// mean |v| (px/s)
    pub mean_speed: f64,
    /// std(position) / mean(|position|)
    pub coefficient_of_variation: f64,
    /// velocity sign changes per second
    pub direction_change_rate: f64,
    /// share of samples faster than the 75th speed percentile
    pub fast_phase_fraction: f64,
    pub speed_kurtosis: f64,
    pub speed_skewness: f64,
}

/// Displacement, speed and acceleration statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicSummary {
    pub displacement_range: f64,
    pub displacement_std: f64,
    pub displacement_rms: f64,
    pub speed_mean: f64,
    pub speed_max: f64,
    pub speed_p95: f64,
    pub acceleration_mean: f64,
    pub acceleration_max: f64,
    pub acceleration_p95: f64,
    /// `1 - share(speed < p10)`
    pub continuity: f64,
    /// share of samples with speed > mean + 2 std
    pub high_speed_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityAssessment {
    /// Weighted score in [0, 10]
    pub score: f64,
    pub grade: IntensityGrade,
}

/// Time split between directions and how long each direction persists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Directionality {
    pub rightward_fraction: f64,
    pub leftward_fraction: f64,
    /// share of samples with |v| below the stationary threshold
    pub stationary_fraction: f64,
    /// mean same-sign run length over trace length, in [0, 1]
    pub persistence: f64,
    /// |right - left|
    pub bias: f64,
    /// max - mean of position
    pub rightward_extent: f64,
    /// mean - min of position
    pub leftward_extent: f64,
    pub pattern: DirectionPattern,
}

/// Two-axis motion descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarMotion {
    pub orientation: Orientation,
    pub x_range: f64,
    pub y_range: f64,
    pub x_amplitude_std: f64,
    pub y_amplitude_std: f64,
    /// `sqrt(std_x^2 + std_y^2)`
    pub total_amplitude: f64,
    pub high_speed_ratio: f64,
    pub high_accel_ratio: f64,
    pub speed_burden: SpeedBurden,
    /// Autocorrelation period of the x trace (s), when one was found
    pub regularity_period_secs: Option<f64>,
}

/// Everything the classifier derives from one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    pub amplitude_class: AmplitudeClass,
    pub velocity_class: VelocityClass,
    pub regularity_class: RegularityClass,
    pub pattern: MotionPattern,
    pub features: MotionFeatures,
    pub kinematics: KinematicSummary,
    pub intensity: IntensityAssessment,
    pub directionality: Directionality,
    pub waveform: WaveformResult,
    pub clinical_notes: Vec<ClinicalNote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(MotionPattern::Jerk.to_string(), "jerk (impulsive)");
        assert_eq!(WaveformType::RegularSinusoidal.to_string(), "regular sinusoidal");
        assert_eq!(DirectionPattern::RapidAlternating.to_string(), "rapid-alternating");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&IntensityGrade::Extreme).expect("serializes");
        assert_eq!(json, "\"extreme\"");
        let back: WaveformType =
            serde_json::from_str("\"semi_regular_jagged\"").expect("deserializes");
        assert_eq!(back, WaveformType::SemiRegularJagged);
    }
}
