//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausible-range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

const PRESET_FIELDS: &[&str] = &[
    "band_low_hz",
    "band_high_hz",
    "prominence_fraction",
    "min_peak_separation_hz",
    "harmonic_tolerance_hz",
    "harmonic_power_ratio",
    "max_harmonic",
    "secondary_power_ratio",
    "max_secondary_peaks",
    "kinematics_from_smoothed",
    "bands",
];

/// Returns the complete set of valid dotted key paths for `AnalysisConfig`.
///
/// Maintained by hand to match the struct hierarchy in analysis_config.rs.
pub fn known_config_keys() -> HashSet<String> {
    let keys: &[&str] = &[
        // [sampling]
        "sampling",
        "sampling.fps",
        // [screen]
        "screen",
        "screen.width_px",
        "screen.height_px",
        "screen.dpi",
        "screen.viewing_distance_cm",
        // [smoothing]
        "smoothing",
        "smoothing.window",
        "smoothing.polyorder",
        // [frequency]
        "frequency",
        "frequency.preset",
        "frequency.stability_window_secs",
        "frequency.min_stability_window",
        "frequency.planar",
        "frequency.horizontal",
        // [classification]
        "classification",
        "classification.amplitude_micro_px",
        "classification.amplitude_small_px",
        "classification.amplitude_medium_px",
        "classification.velocity_slow_px_s",
        "classification.velocity_medium_px_s",
        "classification.regularity_regular_cv",
        "classification.regularity_semi_cv",
        "classification.stationary_speed_px_s",
        "classification.high_speed_px_s",
        "classification.high_accel_px_s2",
        // [intensity]
        "intensity",
        "intensity.displacement_ceiling_px",
        "intensity.speed_ceiling_px_s",
        "intensity.acceleration_ceiling_px_s2",
        "intensity.complexity_ceiling",
        "intensity.weights",
        "intensity.weights.displacement",
        "intensity.weights.speed",
        "intensity.weights.acceleration",
        "intensity.weights.complexity",
        "intensity.weights.continuity",
        // [precision]
        "precision",
        "precision.thresholds_px",
    ];

    let mut known: HashSet<String> = keys.iter().map(|k| (*k).to_string()).collect();
    for preset in ["frequency.planar", "frequency.horizontal"] {
        for field in PRESET_FIELDS {
            known.insert(format!("{preset}.{field}"));
        }
    }
    known
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        // Tie-break on the key itself so suggestions are deterministic
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.clone())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Unknown keys never fail the load.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new(); // parse errors are reported by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausible Range Validation
// ============================================================================

/// Check values that are legal but unusual for an eye-tracking setup.
///
/// Returns (errors, warnings): errors prevent the run, warnings are logged.
pub fn validate_physical_ranges(
    config: &super::AnalysisConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let fps = config.sampling.fps;
    if fps.is_finite() && fps > 0.0 && !(20.0..=2000.0).contains(&fps) {
        warnings.push(ValidationWarning {
            field: "sampling.fps".to_string(),
            message: format!("sampling.fps = {fps:.1} is unusual for an eye tracker (20-2000 Hz)"),
            suggestion: None,
        });
    }

    // A band above Nyquist can never contain a peak
    let nyquist = fps / 2.0;
    for (name, preset) in [
        ("frequency.planar", &config.frequency.planar),
        ("frequency.horizontal", &config.frequency.horizontal),
    ] {
        if fps > 0.0 && preset.band_low_hz >= nyquist {
            errors.push(format!(
                "{name}.band_low_hz = {:.2} is at or above Nyquist ({nyquist:.2} Hz)",
                preset.band_low_hz
            ));
        }
    }

    let d = config.screen.viewing_distance_cm;
    if d > 0.0 && !(20.0..=300.0).contains(&d) {
        warnings.push(ValidationWarning {
            field: "screen.viewing_distance_cm".to_string(),
            message: format!("screen.viewing_distance_cm = {d:.1} is outside the usual 20-300 cm"),
            suggestion: None,
        });
    }

    let dpi = config.screen.dpi;
    if dpi > 0.0 && !(50.0..=600.0).contains(&dpi) {
        warnings.push(ValidationWarning {
            field: "screen.dpi".to_string(),
            message: format!("screen.dpi = {dpi:.0} is outside the usual 50-600"),
            suggestion: None,
        });
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("fps", "fps"), 0);
    }

    #[test]
    fn test_typo_gets_suggestion() {
        let warnings = validate_unknown_keys("[sampling]\nfsp = 60.0\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "sampling.fsp");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("sampling.fps"));
    }

    #[test]
    fn test_known_keys_produce_no_warnings() {
        let toml_str = r#"
[screen]
dpi = 110.0

[intensity.weights]
speed = 0.25
"#;
        assert!(validate_unknown_keys(toml_str).is_empty());
    }

    #[test]
    fn test_preset_fields_are_known() {
        let known = known_config_keys();
        assert!(known.contains("frequency.planar.band_low_hz"));
        assert!(known.contains("frequency.horizontal.bands"));
    }

    #[test]
    fn test_band_above_nyquist_is_error() {
        let mut config = crate::config::AnalysisConfig::default();
        config.sampling.fps = 20.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty(), "0.5 Hz and 0.2 Hz are below 10 Hz Nyquist");
        assert!(warnings.is_empty());

        config.frequency.planar.band_low_hz = 12.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert_eq!(errors.len(), 1);
    }
}
