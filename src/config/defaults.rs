//! Built-in default constants.
//!
//! Every literal threshold used by the analysis pipeline lives here so the
//! TOML layer and the analysis code agree on a single source of truth.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Sampling
// ============================================================================

/// Eye-tracker frame rate (Hz).
pub const FPS: f64 = 60.0;

// ============================================================================
// Screen Geometry
// ============================================================================

pub const SCREEN_WIDTH_PX: f64 = 1920.0;
pub const SCREEN_HEIGHT_PX: f64 = 1080.0;
pub const SCREEN_DPI: f64 = 96.0;

/// Eye-to-screen distance (cm) used for visual-angle conversion.
pub const VIEWING_DISTANCE_CM: f64 = 60.0;

pub const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// Smoothing
// ============================================================================

/// Savitzky-Golay window length (samples, odd).
pub const SAVGOL_WINDOW: usize = 5;

/// Savitzky-Golay polynomial order.
pub const SAVGOL_POLYORDER: usize = 2;

// ============================================================================
// Frequency Analysis
// ============================================================================

/// Planar (two-axis) preset band, Hz.
pub const PLANAR_BAND_LOW_HZ: f64 = 0.5;
pub const PLANAR_BAND_HIGH_HZ: f64 = 15.0;
pub const PLANAR_PROMINENCE_FRACTION: f64 = 0.3;

/// Horizontal (single-axis) preset band, Hz.
pub const HORIZONTAL_BAND_LOW_HZ: f64 = 0.2;
pub const HORIZONTAL_BAND_HIGH_HZ: f64 = 20.0;
pub const HORIZONTAL_PROMINENCE_FRACTION: f64 = 0.2;

/// Minimum spacing between two spectral peaks (Hz).
pub const MIN_PEAK_SEPARATION_HZ: f64 = 0.5;

/// Search half-width around k x f0 when looking for harmonics (Hz).
pub const HARMONIC_TOLERANCE_HZ: f64 = 0.5;

/// Harmonic must carry more than this fraction of the dominant power.
pub const HARMONIC_POWER_RATIO: f64 = 0.1;

/// Highest harmonic multiplier searched.
pub const MAX_HARMONIC: usize = 5;

/// Secondary peak must carry more than this fraction of the dominant power.
pub const SECONDARY_POWER_RATIO: f64 = 0.3;
pub const MAX_SECONDARY_PEAKS: usize = 3;

/// Sliding window for frequency stability (seconds), capped at n/4 samples.
pub const STABILITY_WINDOW_SECS: f64 = 2.0;

/// Windows shorter than this produce a stability of 0.
pub const MIN_STABILITY_WINDOW: usize = 10;

// ============================================================================
// Waveform
// ============================================================================

/// Autocorrelation peak height for periodicity (fraction of zero lag).
pub const PERIODICITY_MIN_HEIGHT: f64 = 0.3;

/// Maximum autocorrelation lag searched (seconds).
pub const PERIODICITY_MAX_LAG_SECS: f64 = 3.0;

/// Minimum trace length for periodicity.
pub const PERIODICITY_MIN_SAMPLES: usize = 10;

/// Minimum spacing between waveform extrema (seconds).
pub const EXTREMA_MIN_SEPARATION_SECS: f64 = 0.1;

/// Approximate entropy embedding dimension.
pub const APEN_EMBEDDING: usize = 2;

/// Approximate entropy tolerance as a fraction of the signal std.
pub const APEN_TOLERANCE_FRACTION: f64 = 0.2;

// ============================================================================
// Classification
// ============================================================================

pub const AMPLITUDE_MICRO_PX: f64 = 20.0;
pub const AMPLITUDE_SMALL_PX: f64 = 50.0;
pub const AMPLITUDE_MEDIUM_PX: f64 = 100.0;

pub const VELOCITY_SLOW_PX_S: f64 = 50.0;
pub const VELOCITY_MEDIUM_PX_S: f64 = 200.0;

pub const REGULARITY_REGULAR_CV: f64 = 0.3;
pub const REGULARITY_SEMI_CV: f64 = 0.6;

/// Velocity below this magnitude counts as stationary (px/s).
pub const STATIONARY_SPEED_PX_S: f64 = 10.0;

/// Planar speed-burden thresholds.
pub const HIGH_SPEED_PX_S: f64 = 200.0;
pub const HIGH_ACCEL_PX_S2: f64 = 1000.0;

// ============================================================================
// Intensity Score
// ============================================================================

pub const INTENSITY_DISPLACEMENT_CEILING_PX: f64 = 100.0;
pub const INTENSITY_SPEED_CEILING_PX_S: f64 = 500.0;
pub const INTENSITY_ACCEL_CEILING_PX_S2: f64 = 2000.0;
pub const INTENSITY_COMPLEXITY_CEILING: f64 = 1.0;

pub const INTENSITY_WEIGHT_DISPLACEMENT: f64 = 0.25;
pub const INTENSITY_WEIGHT_SPEED: f64 = 0.25;
pub const INTENSITY_WEIGHT_ACCELERATION: f64 = 0.2;
pub const INTENSITY_WEIGHT_COMPLEXITY: f64 = 0.15;
pub const INTENSITY_WEIGHT_CONTINUITY: f64 = 0.15;

// ============================================================================
// Error Metrics
// ============================================================================

/// Pixel thresholds for the precision bands.
pub const PRECISION_THRESHOLDS_PX: [f64; 10] =
    [1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0, 30.0, 50.0, 100.0];

/// z-value for the 95% confidence half-width.
pub const CI95_Z: f64 = 1.96;

/// Upper bound on the rolling error-trend window (samples).
pub const ERROR_TREND_MAX_WINDOW: usize = 10;

/// The rolling window is n / this divisor, capped at `ERROR_TREND_MAX_WINDOW`.
pub const ERROR_TREND_DIVISOR: usize = 20;

/// Denominators below this magnitude are treated as zero.
pub const NEAR_ZERO: f64 = 1e-12;

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "NYSTAGMUS_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "nystagmus.toml";
