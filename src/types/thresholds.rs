//! Fixed rule thresholds for the pattern, waveform and quality classifiers.
//!
//! These define classification boundaries in the reference reports and are
//! not exposed through the TOML config.

/// Motion pattern rules (direction changes per second, fractions).
pub mod pattern_thresholds {
    // === Pattern Label ===
    /// Above this change rate the trace oscillates (jerk or pendular)
    pub const OSCILLATING_CHANGE_RATE_HZ: f64 = 3.0;
    /// Fast-phase share needed for jerk / pendular
    pub const OSCILLATING_FAST_FRACTION: f64 = 0.3;
    /// |skew| of the speed distribution above this marks a jerk beat
    pub const JERK_SPEED_SKEW: f64 = 0.5;
    /// Speed kurtosis (Fisher) above this marks a jerk beat
    pub const JERK_SPEED_KURTOSIS: f64 = 0.0;
    pub const MIXED_CHANGE_RATE_HZ: f64 = 1.5;
    pub const DRIFT_CHANGE_RATE_HZ: f64 = 0.5;
    /// Percentile of speed splitting slow and fast phases
    pub const FAST_PHASE_PERCENTILE: f64 = 75.0;

    // === Direction Pattern ===
    pub const DIRECTION_BIAS: f64 = 0.3;
    pub const PERSISTENCE_SUSTAINED: f64 = 0.7;
    pub const PERSISTENCE_INTERMITTENT: f64 = 0.3;

    // === Intensity Grade ===
    pub const INTENSITY_EXTREME: f64 = 8.0;
    pub const INTENSITY_SEVERE: f64 = 6.0;
    pub const INTENSITY_MODERATE: f64 = 4.0;
    pub const INTENSITY_MILD: f64 = 2.0;

    // === Kinematic Summary ===
    /// Samples slower than this speed percentile count as still
    pub const STILL_SPEED_PERCENTILE: f64 = 10.0;
    /// High-speed outliers are above mean + this many std
    pub const HIGH_SPEED_SIGMA: f64 = 2.0;
}

/// Waveform type decision table.
pub mod waveform_thresholds {
    pub const REGULAR_PERIODICITY: f64 = 0.6;
    pub const REGULAR_SMOOTHNESS: f64 = 0.7;
    pub const SINUSOIDAL_SYMMETRY: f64 = 0.8;
    pub const SEMI_REGULAR_PERIODICITY: f64 = 0.4;
    pub const SEMI_REGULAR_SMOOTHNESS: f64 = 0.5;
    pub const IRREGULAR_SMOOTHNESS: f64 = 0.7;
}

/// Two-axis orientation and speed-burden rules.
pub mod planar_thresholds {
    /// One axis range must exceed the other by this factor to dominate
    pub const AXIS_DOMINANCE_RATIO: f64 = 2.0;
    /// Relative range difference below this means rotary/mixed
    pub const ROTARY_RELATIVE_DIFFERENCE: f64 = 0.5;
    pub const SEVERE_HIGH_SPEED_RATIO: f64 = 0.3;
    pub const SEVERE_HIGH_ACCEL_RATIO: f64 = 0.2;
    pub const MODERATE_HIGH_SPEED_RATIO: f64 = 0.1;
    pub const MODERATE_HIGH_ACCEL_RATIO: f64 = 0.1;
    /// Regularity period needs more than one second of data at 60 fps
    pub const REGULARITY_MIN_SAMPLES: usize = 60;
    /// Autocorrelation peak height (fraction of zero lag)
    pub const REGULARITY_PEAK_HEIGHT: f64 = 0.3;
}

/// Non-diagnostic clinical observation rules.
pub mod clinical_thresholds {
    pub const HIGH_INTENSITY_SCORE: f64 = 7.0;
    pub const MODERATE_INTENSITY_SCORE: f64 = 4.0;
    pub const TYPICAL_FREQUENCY_LOW_HZ: f64 = 1.0;
    pub const TYPICAL_FREQUENCY_HIGH_HZ: f64 = 5.0;
    pub const HIGH_FREQUENCY_HZ: f64 = 8.0;
    pub const ASYMMETRY: f64 = 0.5;
}

/// Predictor quality grades.
pub mod quality_thresholds {
    // === NRMSE Grade ===
    pub const NRMSE_EXCELLENT: f64 = 0.85;
    pub const NRMSE_VERY_GOOD: f64 = 0.75;
    pub const NRMSE_GOOD: f64 = 0.60;
    pub const NRMSE_ACCEPTABLE: f64 = 0.45;

    // === Composite Score (one point each) ===
    pub const COMPOSITE_NRMSE: f64 = 0.6;
    pub const COMPOSITE_CORRELATION: f64 = 0.85;
    pub const COMPOSITE_R_SQUARED: f64 = 0.7;
    /// Pixel threshold whose precision band is scored
    pub const COMPOSITE_PRECISION_PX: f64 = 10.0;
    pub const COMPOSITE_PRECISION_PERCENT: f64 = 50.0;
    pub const COMPOSITE_MEAN_ERROR_PX: f64 = 20.0;
    pub const OVERALL_EXCELLENT_POINTS: u8 = 4;
    pub const OVERALL_GOOD_POINTS: u8 = 3;
    pub const OVERALL_FAIR_POINTS: u8 = 2;

    // === Mean Error Grade (px) ===
    pub const MEAN_ERROR_EXCELLENT: f64 = 15.0;
    pub const MEAN_ERROR_GOOD: f64 = 25.0;
    pub const MEAN_ERROR_FAIR: f64 = 40.0;
    pub const MEAN_ERROR_POOR: f64 = 60.0;
}
