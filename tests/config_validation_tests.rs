//! Config Validation Tests
//!
//! Exercises typo detection, range validation and TOML round-trips of the
//! analysis configuration independently from the pipeline.

use nystagmus_analyzer::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use nystagmus_analyzer::config::{AnalysisConfig, ConfigError, PresetSelection};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_screen_section_warns_with_suggestion() {
    let toml_str = r#"
[screen]
viewing_distanse_cm = 55.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("viewing_distanse_cm"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("screen.viewing_distance_cm"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn far_off_key_has_no_suggestion() {
    let warnings = validate_unknown_keys("[sampling]\ncompletely_unrelated_setting = 1\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].suggestion.is_none());
    assert!(suggest_correction("zzzzzzzz", &known_config_keys()).is_none());
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[sampling]
fps = 120.0

[screen]
width_px = 2560.0
height_px = 1440.0
dpi = 109.0
viewing_distance_cm = 65.0

[smoothing]
window = 9
polyorder = 3

[frequency]
preset = "horizontal"
stability_window_secs = 2.0

[precision]
thresholds_px = [2.0, 5.0, 10.0]
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");

    let config = AnalysisConfig::from_toml_str(toml_str).expect("valid config");
    assert_eq!(config.sampling.fps, 120.0);
    assert_eq!(config.frequency.preset, PresetSelection::Horizontal);
    assert_eq!(config.precision.thresholds_px, vec![2.0, 5.0, 10.0]);
    // Untouched sections keep their defaults
    assert_eq!(
        config.classification.amplitude_micro_px,
        AnalysisConfig::default().classification.amplitude_micro_px
    );
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn default_config_is_valid() {
    let config = AnalysisConfig::default();
    assert!(config.validate().is_ok());
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn non_positive_fps_is_rejected() {
    let result = AnalysisConfig::from_toml_str("[sampling]\nfps = 0.0\n");
    match result {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("sampling.fps")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unordered_precision_thresholds_are_rejected() {
    let mut config = AnalysisConfig::default();
    config.precision.thresholds_px = vec![5.0, 2.0, 10.0];
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn intensity_weights_must_sum_to_one() {
    let mut config = AnalysisConfig::default();
    config.intensity.weights.speed += 0.5;
    let Err(ConfigError::Validation(errors)) = config.validate() else {
        panic!("weights summing to 1.5 must fail");
    };
    assert!(errors.iter().any(|e| e.contains("intensity.weights")), "{errors:?}");
}

#[test]
fn inverted_frequency_band_is_rejected() {
    let mut config = AnalysisConfig::default();
    config.frequency.horizontal.band_low_hz = 25.0;
    config.frequency.horizontal.band_high_hz = 5.0;
    assert!(config.validate().is_err());
}

#[test]
fn unusual_frame_rate_only_warns() {
    let mut config = AnalysisConfig::default();
    config.sampling.fps = 5000.0;
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "sampling.fps");
}

// ============================================================================
// Round-Trip
// ============================================================================

#[test]
fn default_config_round_trips_through_toml() {
    let config = AnalysisConfig::default();
    let toml_str = config.to_toml().expect("serialize defaults");
    let parsed = AnalysisConfig::from_toml_str(&toml_str).expect("parse serialized defaults");

    assert_eq!(parsed.sampling.fps, config.sampling.fps);
    assert_eq!(parsed.frequency.planar.bands, config.frequency.planar.bands);
    assert_eq!(parsed.frequency.preset, config.frequency.preset);
    assert!(validate_unknown_keys(&toml_str).is_empty(), "serialized keys must all be known");
}

#[test]
fn preset_selection_parses_cli_values() {
    assert_eq!("Planar".parse::<PresetSelection>(), Ok(PresetSelection::Planar));
    assert_eq!("auto".parse::<PresetSelection>(), Ok(PresetSelection::Auto));
    assert!("vertical".parse::<PresetSelection>().is_err());
}
