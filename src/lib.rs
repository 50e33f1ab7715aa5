//! Nystagmus Analyzer: offline gaze-trace characterization
//!
//! Reads logged gaze recordings (actual gaze position plus a predictor's
//! estimate) and produces two analyses per recording.
//!
//! ## Architecture
//!
//! - **Loader**: CSV layout detection, row validation, sample indexing
//! - **Processing**: statistics, Savitzky-Golay smoothing, spectra, waveform shape
//! - **Analysis**: pattern / intensity classification, two-axis motion,
//!   predictor error metrics, per-frame reduction decomposition
//! - **Session**: orchestrates one recording into a `SessionReport`
//! - **Report**: plain-text rendering for the terminal

pub mod analysis;
pub mod config;
pub mod loader;
pub mod processing;
pub mod report;
pub mod session;
pub mod types;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError, PresetSelection};

// Re-export commonly used types
pub use types::{
    ErrorMetrics, FrequencyCategory, FrequencyResult, GazeSample, GazeTrace, InputLayout,
    MotionPattern, PatternResult, PredictionReport, ReductionOutcome, SessionReport,
    TrajectoryReport, WaveformResult,
};

// Re-export the pipeline stages
pub use analysis::{ErrorMetricsEngine, PatternClassifier, PlanarAnalyzer, ReductionAnalyzer};
pub use loader::{load_trace, read_trace, LoadError};
pub use processing::{FrequencyAnalyzer, WaveformAnalyzer};
pub use session::SessionAnalyzer;
