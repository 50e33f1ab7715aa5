//! Spectral characterization records.

use serde::{Deserialize, Serialize};

/// A spectral peak: frequency (Hz) and power (magnitude squared).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralPeak {
    pub frequency: f64,
    pub power: f64,
}

/// A harmonic of the dominant frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Multiplier of the dominant frequency (2..=5)
    pub order: usize,
    pub frequency: f64,
    pub power: f64,
}

/// Seven ordered frequency bins plus the no-detection case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyCategory {
    /// No qualifying spectral peak
    NoDistinctFrequency,
    /// < 0.5 Hz
    UltraLow,
    /// 0.5 - 1.5 Hz
    Low,
    /// 1.5 - 3 Hz
    LowMid,
    /// 3 - 5 Hz
    Mid,
    /// 5 - 8 Hz
    MidHigh,
    /// 8 - 12 Hz
    High,
    /// > 12 Hz
    UltraHigh,
}

impl FrequencyCategory {
    pub fn from_frequency(freq: Option<f64>) -> Self {
        match freq {
            None => Self::NoDistinctFrequency,
            Some(f) if f < 0.5 => Self::UltraLow,
            Some(f) if f < 1.5 => Self::Low,
            Some(f) if f < 3.0 => Self::LowMid,
            Some(f) if f < 5.0 => Self::Mid,
            Some(f) if f < 8.0 => Self::MidHigh,
            Some(f) if f < 12.0 => Self::High,
            Some(_) => Self::UltraHigh,
        }
    }
}

impl std::fmt::Display for FrequencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NoDistinctFrequency => "no distinct frequency feature",
            Self::UltraLow => "ultra-low frequency (<0.5 Hz)",
            Self::Low => "low frequency (0.5-1.5 Hz)",
            Self::LowMid => "low-mid frequency (1.5-3 Hz)",
            Self::Mid => "mid frequency (3-5 Hz)",
            Self::MidHigh => "mid-high frequency (5-8 Hz)",
            Self::High => "high frequency (8-12 Hz)",
            Self::UltraHigh => "ultra-high frequency (>12 Hz)",
        };
        write!(f, "{label}")
    }
}

/// Coarse per-axis class used for two-axis recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisFrequencyClass {
    None,
    /// 0.5 - 3 Hz inclusive
    Low,
    /// (3, 7] Hz
    Mid,
    /// (7, 15] Hz
    High,
    Atypical,
}

impl AxisFrequencyClass {
    pub fn from_frequency(freq: Option<f64>) -> Self {
        match freq {
            None => Self::None,
            Some(f) if (0.5..=3.0).contains(&f) => Self::Low,
            Some(f) if f > 3.0 && f <= 7.0 => Self::Mid,
            Some(f) if f > 7.0 && f <= 15.0 => Self::High,
            Some(_) => Self::Atypical,
        }
    }
}

impl std::fmt::Display for AxisFrequencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low (0.5-3 Hz)"),
            Self::Mid => write!(f, "mid (3-7 Hz)"),
            Self::High => write!(f, "high (7-15 Hz)"),
            Self::Atypical => write!(f, "atypical"),
        }
    }
}

/// Share of total spectral power in one named sub-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandEnergy {
    pub name: String,
    pub low_hz: f64,
    pub high_hz: f64,
    /// Percentage of total power, 0-100
    pub share_percent: f64,
}

/// Frequency-domain characterization of one position trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResult {
    /// `None` when no qualifying peak exists in the band
    pub dominant: Option<SpectralPeak>,
    pub category: FrequencyCategory,
    /// `1 - std/mean` of windowed dominant frequencies, in [0, 1]
    pub stability: f64,
    pub harmonics: Vec<Harmonic>,
    pub secondary: Vec<SpectralPeak>,
    pub bands: Vec<BandEnergy>,
    /// Name of the highest-share band, `None` when the spectrum is empty
    pub dominant_band: Option<String>,
    /// Frequency resolution of the transform (Hz)
    pub resolution_hz: f64,
}

impl FrequencyResult {
    /// Dominant frequency, 0 when absent.
    pub fn dominant_frequency(&self) -> f64 {
        self.dominant.map_or(0.0, |p| p.frequency)
    }

    pub fn dominant_power(&self) -> f64 {
        self.dominant.map_or(0.0, |p| p.power)
    }

    /// Result for a trace with no usable spectrum.
    pub fn empty(resolution_hz: f64) -> Self {
        Self {
            dominant: None,
            category: FrequencyCategory::NoDistinctFrequency,
            stability: 0.0,
            harmonics: Vec::new(),
            secondary: Vec::new(),
            bands: Vec::new(),
            dominant_band: None,
            resolution_hz,
        }
    }
}
