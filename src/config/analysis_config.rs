//! Analysis Configuration - every pipeline constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so running without a config file reproduces the reference reports exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis run.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$NYSTAGMUS_CONFIG` env var
/// 2. `./nystagmus.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Recording frame rate
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Display geometry used for pixel-to-angle conversion
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Savitzky-Golay smoothing
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Spectral analysis presets
    #[serde(default)]
    pub frequency: FrequencyConfig,

    /// Amplitude / velocity / regularity cut-offs
    #[serde(default)]
    pub classification: ClassificationThresholds,

    /// Intensity score ceilings and weights
    #[serde(default)]
    pub intensity: IntensityConfig,

    /// Precision band thresholds
    #[serde(default)]
    pub precision: PrecisionConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$NYSTAGMUS_CONFIG` environment variable
    /// 2. `./nystagmus.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analysis config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Frequency preset for a given input layout, honouring an explicit override.
    pub fn frequency_preset(&self, planar: bool) -> &FrequencyPreset {
        match self.frequency.preset {
            PresetSelection::Planar => &self.frequency.planar,
            PresetSelection::Horizontal => &self.frequency.horizontal,
            PresetSelection::Auto if planar => &self.frequency.planar,
            PresetSelection::Auto => &self.frequency.horizontal,
        }
    }

    /// Name of the preset `frequency_preset` resolves to.
    pub fn frequency_preset_name(&self, planar: bool) -> &'static str {
        match self.frequency.preset {
            PresetSelection::Planar => "planar",
            PresetSelection::Horizontal => "horizontal",
            PresetSelection::Auto if planar => "planar",
            PresetSelection::Auto => "horizontal",
        }
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Every numeric value must be finite
    /// - Escalating cut-offs must be strictly increasing
    /// - Intensity weights must sum to approximately 1.0
    /// - Frequency bands must satisfy low < high
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.sampling.fps <= 0.0 || !self.sampling.fps.is_finite() {
            errors.push(format!("sampling.fps must be > 0 (got {})", self.sampling.fps));
        }

        let s = &self.screen;
        for (name, value) in [
            ("screen.width_px", s.width_px),
            ("screen.height_px", s.height_px),
            ("screen.dpi", s.dpi),
            ("screen.viewing_distance_cm", s.viewing_distance_cm),
        ] {
            if value <= 0.0 || !value.is_finite() {
                errors.push(format!("{name} must be > 0 (got {value})"));
            }
        }

        let sm = &self.smoothing;
        if sm.window < 3 {
            errors.push(format!("smoothing.window must be >= 3 (got {})", sm.window));
        }
        if sm.polyorder >= sm.window {
            errors.push(format!(
                "smoothing.polyorder ({}) must be < smoothing.window ({})",
                sm.polyorder, sm.window
            ));
        }

        Self::check_preset(&self.frequency.planar, "frequency.planar", &mut errors);
        Self::check_preset(&self.frequency.horizontal, "frequency.horizontal", &mut errors);
        if self.frequency.stability_window_secs <= 0.0 {
            errors.push("frequency.stability_window_secs must be > 0".to_string());
        }

        let c = &self.classification;
        Self::check_ascending(
            &[c.amplitude_micro_px, c.amplitude_small_px, c.amplitude_medium_px],
            "classification.amplitude",
            &mut errors,
        );
        Self::check_ascending(
            &[c.velocity_slow_px_s, c.velocity_medium_px_s],
            "classification.velocity",
            &mut errors,
        );
        Self::check_ascending(
            &[c.regularity_regular_cv, c.regularity_semi_cv],
            "classification.regularity",
            &mut errors,
        );

        let i = &self.intensity;
        for (name, value) in [
            ("intensity.displacement_ceiling_px", i.displacement_ceiling_px),
            ("intensity.speed_ceiling_px_s", i.speed_ceiling_px_s),
            ("intensity.acceleration_ceiling_px_s2", i.acceleration_ceiling_px_s2),
            ("intensity.complexity_ceiling", i.complexity_ceiling),
        ] {
            if value <= 0.0 {
                errors.push(format!("{name} must be > 0 (used as divisor)"));
            }
        }
        let w = &i.weights;
        let weight_sum = w.displacement + w.speed + w.acceleration + w.complexity + w.continuity;
        if !(0.95..=1.05).contains(&weight_sum) {
            errors.push(format!("intensity.weights must sum to ~1.0, got {weight_sum:.2}"));
        }

        let p = &self.precision.thresholds_px;
        if p.is_empty() {
            errors.push("precision.thresholds_px must not be empty".to_string());
        } else {
            Self::check_ascending(p, "precision.thresholds_px", &mut errors);
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // Reject NaN/Inf in any value (sweep all f64 fields via serialization)
        if let Ok(ref s) = toml::to_string(self) {
            if s.contains("nan") || s.contains("inf") {
                errors.push("Config contains NaN or Inf values, all values must be finite numbers".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_preset(p: &FrequencyPreset, name: &str, errors: &mut Vec<String>) {
        if p.band_low_hz < 0.0 || p.band_low_hz >= p.band_high_hz {
            errors.push(format!(
                "{name}: band_low_hz ({:.2}) must be >= 0 and < band_high_hz ({:.2})",
                p.band_low_hz, p.band_high_hz
            ));
        }
        for (field, value) in [
            ("prominence_fraction", p.prominence_fraction),
            ("harmonic_power_ratio", p.harmonic_power_ratio),
            ("secondary_power_ratio", p.secondary_power_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{name}.{field} must be within [0, 1] (got {value})"));
            }
        }
        if p.min_peak_separation_hz < 0.0 || p.harmonic_tolerance_hz < 0.0 {
            errors.push(format!("{name}: peak separation and harmonic tolerance must be >= 0"));
        }
        for band in &p.bands {
            if band.low_hz >= band.high_hz {
                errors.push(format!(
                    "{name}.bands '{}': low_hz ({:.2}) must be < high_hz ({:.2})",
                    band.name, band.low_hz, band.high_hz
                ));
            }
        }
    }

    fn check_ascending(values: &[f64], name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them explicitly
        if values.iter().any(|v| !v.is_finite()) {
            errors.push(format!("{name}: values must be finite (got {values:?})"));
            return;
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            errors.push(format!("{name}: values must be strictly increasing (got {values:?})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sampling
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Frame rate of the gaze recording (Hz)
    #[serde(default = "default_fps")]
    pub fps: f64,
}

fn default_fps() -> f64 {
    defaults::FPS
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl SamplingConfig {
    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.fps
    }
}

// ============================================================================
// Screen
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width_px: f64,
    pub height_px: f64,
    pub dpi: f64,
    pub viewing_distance_cm: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width_px: defaults::SCREEN_WIDTH_PX,
            height_px: defaults::SCREEN_HEIGHT_PX,
            dpi: defaults::SCREEN_DPI,
            viewing_distance_cm: defaults::VIEWING_DISTANCE_CM,
        }
    }
}

impl ScreenConfig {
    pub fn pixels_per_cm(&self) -> f64 {
        self.dpi / defaults::CM_PER_INCH
    }

    pub fn diagonal_px(&self) -> f64 {
        self.width_px.hypot(self.height_px)
    }
}

// ============================================================================
// Smoothing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Savitzky-Golay window (forced odd, capped at the trace length)
    pub window: usize,
    pub polyorder: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: defaults::SAVGOL_WINDOW,
            polyorder: defaults::SAVGOL_POLYORDER,
        }
    }
}

// ============================================================================
// Frequency
// ============================================================================

/// Which frequency preset to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetSelection {
    /// Planar preset for two-axis recordings, horizontal preset otherwise
    #[default]
    Auto,
    Planar,
    Horizontal,
}

impl std::str::FromStr for PresetSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "planar" => Ok(Self::Planar),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(format!("unknown preset '{other}' (expected auto, planar or horizontal)")),
        }
    }
}

/// A named frequency sub-band, `[low_hz, high_hz)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub name: String,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl BandSpec {
    fn new(name: &str, low_hz: f64, high_hz: f64) -> Self {
        Self {
            name: name.to_string(),
            low_hz,
            high_hz,
        }
    }
}

/// Peak-detection and band parameters for one family of recordings.
///
/// A `[frequency.planar]` or `[frequency.horizontal]` table replaces the
/// built-in preset as a whole, so every field must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyPreset {
    pub band_low_hz: f64,
    pub band_high_hz: f64,
    /// Minimum peak prominence as a fraction of the in-band maximum magnitude
    pub prominence_fraction: f64,
    pub min_peak_separation_hz: f64,
    pub harmonic_tolerance_hz: f64,
    pub harmonic_power_ratio: f64,
    pub max_harmonic: usize,
    pub secondary_power_ratio: f64,
    pub max_secondary_peaks: usize,
    /// Differentiate the smoothed trace rather than the raw one
    pub kinematics_from_smoothed: bool,
    pub bands: Vec<BandSpec>,
}

fn default_bands() -> Vec<BandSpec> {
    vec![
        BandSpec::new("<1 Hz", 0.0, 1.0),
        BandSpec::new("1-3 Hz", 1.0, 3.0),
        BandSpec::new("3-7 Hz", 3.0, 7.0),
        BandSpec::new("7-15 Hz", 7.0, 15.0),
        BandSpec::new(">15 Hz", 15.0, 20.0),
    ]
}

impl FrequencyPreset {
    /// Two-axis recordings: narrower band, raw-trace kinematics.
    pub fn planar() -> Self {
        Self {
            band_low_hz: defaults::PLANAR_BAND_LOW_HZ,
            band_high_hz: defaults::PLANAR_BAND_HIGH_HZ,
            prominence_fraction: defaults::PLANAR_PROMINENCE_FRACTION,
            kinematics_from_smoothed: false,
            ..Self::horizontal()
        }
    }

    /// Single-axis recordings: wide band, smoothed-trace kinematics.
    pub fn horizontal() -> Self {
        Self {
            band_low_hz: defaults::HORIZONTAL_BAND_LOW_HZ,
            band_high_hz: defaults::HORIZONTAL_BAND_HIGH_HZ,
            prominence_fraction: defaults::HORIZONTAL_PROMINENCE_FRACTION,
            min_peak_separation_hz: defaults::MIN_PEAK_SEPARATION_HZ,
            harmonic_tolerance_hz: defaults::HARMONIC_TOLERANCE_HZ,
            harmonic_power_ratio: defaults::HARMONIC_POWER_RATIO,
            max_harmonic: defaults::MAX_HARMONIC,
            secondary_power_ratio: defaults::SECONDARY_POWER_RATIO,
            max_secondary_peaks: defaults::MAX_SECONDARY_PEAKS,
            kinematics_from_smoothed: true,
            bands: default_bands(),
        }
    }

    pub fn in_band(&self, freq: f64) -> bool {
        freq >= self.band_low_hz && freq <= self.band_high_hz
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyConfig {
    pub preset: PresetSelection,
    pub planar: FrequencyPreset,
    pub horizontal: FrequencyPreset,
    pub stability_window_secs: f64,
    pub min_stability_window: usize,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            preset: PresetSelection::Auto,
            planar: FrequencyPreset::planar(),
            horizontal: FrequencyPreset::horizontal(),
            stability_window_secs: defaults::STABILITY_WINDOW_SECS,
            min_stability_window: defaults::MIN_STABILITY_WINDOW,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub amplitude_micro_px: f64,
    pub amplitude_small_px: f64,
    pub amplitude_medium_px: f64,
    pub velocity_slow_px_s: f64,
    pub velocity_medium_px_s: f64,
    pub regularity_regular_cv: f64,
    pub regularity_semi_cv: f64,
    pub stationary_speed_px_s: f64,
    pub high_speed_px_s: f64,
    pub high_accel_px_s2: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            amplitude_micro_px: defaults::AMPLITUDE_MICRO_PX,
            amplitude_small_px: defaults::AMPLITUDE_SMALL_PX,
            amplitude_medium_px: defaults::AMPLITUDE_MEDIUM_PX,
            velocity_slow_px_s: defaults::VELOCITY_SLOW_PX_S,
            velocity_medium_px_s: defaults::VELOCITY_MEDIUM_PX_S,
            regularity_regular_cv: defaults::REGULARITY_REGULAR_CV,
            regularity_semi_cv: defaults::REGULARITY_SEMI_CV,
            stationary_speed_px_s: defaults::STATIONARY_SPEED_PX_S,
            high_speed_px_s: defaults::HIGH_SPEED_PX_S,
            high_accel_px_s2: defaults::HIGH_ACCEL_PX_S2,
        }
    }
}

// ============================================================================
// Intensity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityWeights {
    pub displacement: f64,
    pub speed: f64,
    pub acceleration: f64,
    pub complexity: f64,
    pub continuity: f64,
}

impl Default for IntensityWeights {
    fn default() -> Self {
        Self {
            displacement: defaults::INTENSITY_WEIGHT_DISPLACEMENT,
            speed: defaults::INTENSITY_WEIGHT_SPEED,
            acceleration: defaults::INTENSITY_WEIGHT_ACCELERATION,
            complexity: defaults::INTENSITY_WEIGHT_COMPLEXITY,
            continuity: defaults::INTENSITY_WEIGHT_CONTINUITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityConfig {
    pub displacement_ceiling_px: f64,
    pub speed_ceiling_px_s: f64,
    pub acceleration_ceiling_px_s2: f64,
    pub complexity_ceiling: f64,
    pub weights: IntensityWeights,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            displacement_ceiling_px: defaults::INTENSITY_DISPLACEMENT_CEILING_PX,
            speed_ceiling_px_s: defaults::INTENSITY_SPEED_CEILING_PX_S,
            acceleration_ceiling_px_s2: defaults::INTENSITY_ACCEL_CEILING_PX_S2,
            complexity_ceiling: defaults::INTENSITY_COMPLEXITY_CEILING,
            weights: IntensityWeights::default(),
        }
    }
}

// ============================================================================
// Precision
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    /// Ascending pixel thresholds for the within-N-px percentages
    pub thresholds_px: Vec<f64>,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            thresholds_px: defaults::PRECISION_THRESHOLDS_PX.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: AnalysisConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.sampling.fps, 60.0);
        assert_eq!(config.screen.width_px, 1920.0);
        assert_eq!(config.screen.dpi, 96.0);
        assert_eq!(config.screen.viewing_distance_cm, 60.0);
        assert_eq!(config.precision.thresholds_px.len(), 10);
        assert_eq!(config.frequency.planar.band_high_hz, 15.0);
        assert_eq!(config.frequency.horizontal.band_low_hz, 0.2);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[sampling]
fps = 120.0

[screen]
viewing_distance_cm = 70.0
"#;
        let config = AnalysisConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.sampling.fps, 120.0);
        assert_eq!(config.screen.viewing_distance_cm, 70.0);
        // Non-overridden values retain defaults
        assert_eq!(config.screen.height_px, 1080.0);
        assert_eq!(config.intensity.weights.displacement, 0.25);
    }

    #[test]
    fn test_zero_fps_rejected() {
        let mut config = AnalysisConfig::default();
        config.sampling.fps = 0.0;
        let err = config.validate().expect_err("fps = 0 must fail");
        assert!(err.to_string().contains("sampling.fps"));
    }

    #[test]
    fn test_unordered_amplitude_rejected() {
        let mut config = AnalysisConfig::default();
        config.classification.amplitude_small_px = 10.0;
        assert!(config.validate().is_err(), "micro >= small must be rejected");
    }

    #[test]
    fn test_weight_sum_checked() {
        let mut config = AnalysisConfig::default();
        config.intensity.weights.continuity = 0.5;
        let err = config.validate().expect_err("weights summing to 1.35 must fail");
        assert!(err.to_string().contains("intensity.weights"));
    }

    #[test]
    fn test_preset_selection() {
        let mut config = AnalysisConfig::default();
        assert_eq!(config.frequency_preset(true).band_high_hz, 15.0);
        assert_eq!(config.frequency_preset(false).band_high_hz, 20.0);

        config.frequency.preset = PresetSelection::Horizontal;
        assert_eq!(config.frequency_preset(true).band_high_hz, 20.0);
        assert_eq!("Planar".parse::<PresetSelection>(), Ok(PresetSelection::Planar));
        assert!("diagonal".parse::<PresetSelection>().is_err());
    }

    #[test]
    fn test_round_trip_toml() {
        let config = AnalysisConfig::default();
        let text = config.to_toml().expect("default config serializes");
        let parsed = AnalysisConfig::from_toml_str(&text).expect("serialized config re-parses");
        assert_eq!(parsed.frequency.horizontal.bands, config.frequency.horizontal.bands);
    }

    #[test]
    fn test_screen_geometry() {
        let screen = ScreenConfig::default();
        assert!((screen.pixels_per_cm() - 37.795_275).abs() < 1e-5);
        assert!((screen.diagonal_px() - 2202.907_170).abs() < 1e-5);
    }
}
