//! Session Analyzer
//!
//! Runs both halves of the analysis over one recording:
//!
//! ```text
//! trace ─► smoothing / kinematics ─┬─► FrequencyAnalyzer ─┐
//!                                  └─► WaveformAnalyzer  ─┴─► PatternClassifier ─► TrajectoryReport
//! (actual, predicted) ─► ErrorMetricsEngine ─► ReductionAnalyzer ─────────────────► PredictionReport
//! ```
//!
//! The frequency spectrum is always taken on the smoothed trace; whether
//! velocity comes from the smoothed or the raw trace follows the preset.

use std::path::Path;

use chrono::Utc;

use crate::analysis::{ErrorMetricsEngine, PatternClassifier, PlanarAnalyzer, ReductionAnalyzer};
use crate::config::AnalysisConfig;
use crate::loader::{self, LoadError};
use crate::processing::{DerivedKinematics, FrequencyAnalyzer, WaveformAnalyzer};
use crate::types::{GazeTrace, PredictionReport, SessionReport, TrajectoryReport};

pub struct SessionAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> SessionAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load a recording at the configured frame rate and analyze it.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<SessionReport, LoadError> {
        let path = path.as_ref();
        let trace = loader::load_trace(path, self.config.sampling.fps)?;
        Ok(self.analyze(&path.display().to_string(), &trace))
    }

    pub fn analyze(&self, source: &str, trace: &GazeTrace) -> SessionReport {
        let trajectory = self.analyze_trajectory(trace);
        let prediction = self.analyze_prediction(trace);

        tracing::info!(
            source = source,
            samples = trace.len(),
            dominant_hz = trajectory.frequency.dominant_frequency(),
            pattern = %trajectory.pattern.pattern,
            mean_error_px = prediction.errors.euclidean.mean,
            "Session analyzed"
        );

        SessionReport {
            source: source.to_string(),
            layout: trace.layout,
            fps: trace.fps,
            samples: trace.len(),
            dropped_rows: trace.dropped_rows,
            duration_secs: trace.duration_secs(),
            preset: self
                .config
                .frequency_preset_name(trace.is_planar())
                .to_string(),
            generated_at: Utc::now(),
            trajectory,
            prediction,
        }
    }

    /// Oscillation characterization of the actual gaze trace.
    pub fn analyze_trajectory(&self, trace: &GazeTrace) -> TrajectoryReport {
        let cfg = self.config;
        let fps = trace.fps;
        let preset = cfg.frequency_preset(trace.is_planar());

        let x = trace.actual_x();
        let kx = DerivedKinematics::compute(&x, fps, &cfg.smoothing, preset.kinematics_from_smoothed);

        let frequency = FrequencyAnalyzer::new(
            preset,
            fps,
            cfg.frequency.stability_window_secs,
            cfg.frequency.min_stability_window,
        )
        .analyze(&kx.smoothed);

        let waveform = WaveformAnalyzer::new(fps).analyze(&kx.smoothed, &x);
        let pattern = PatternClassifier::new(&cfg.classification, &cfg.intensity, fps)
            .classify(&x, &kx, &frequency, waveform);

        let planar = trace.actual_y().filter(|_| trace.is_planar()).map(|y| {
            let ky = DerivedKinematics::compute(
                &y,
                fps,
                &cfg.smoothing,
                preset.kinematics_from_smoothed,
            );
            PlanarAnalyzer::new(&cfg.classification, &cfg.frequency, fps).analyze(&x, &y, &kx, &ky)
        });

        TrajectoryReport {
            frequency,
            pattern,
            planar,
        }
    }

    /// Predictor accuracy and per-axis reduction.
    pub fn analyze_prediction(&self, trace: &GazeTrace) -> PredictionReport {
        let errors = ErrorMetricsEngine::new(&self.config.screen, &self.config.precision)
            .analyze_trace(trace);

        let reduction_x = ReductionAnalyzer::analyze(&trace.actual_x(), &trace.predicted_x());
        let reduction_y = match (trace.actual_y(), trace.predicted_y()) {
            (Some(a), Some(p)) if trace.is_planar() => Some(ReductionAnalyzer::analyze(&a, &p)),
            _ => None,
        };

        PredictionReport {
            errors,
            reduction_x,
            reduction_y,
        }
    }
}
