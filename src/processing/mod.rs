//! Signal processing module - smoothing, spectra and waveform descriptors
//!
//! - `kinematics`: Savitzky-Golay smoothing and finite-difference velocity / acceleration
//! - `fft`: magnitude spectra and peak picking
//! - `frequency`: dominant frequency, harmonics, band energy and stability
//! - `waveform`: symmetry, smoothness, periodicity and approximate entropy
//! - `stats`: descriptive statistics shared by the analyzers

mod fft;
mod frequency;
pub mod kinematics;
pub mod stats;
mod waveform;

pub use fft::*;
pub use frequency::FrequencyAnalyzer;
pub use kinematics::{savgol_smooth, DerivedKinematics};
pub use waveform::{
    approximate_entropy, autocorrelation, classify_waveform, periodicity, smoothness, symmetry,
    WaveformAnalyzer,
};

use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),
}
