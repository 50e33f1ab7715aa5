//! Analysis Configuration Module
//!
//! Provides run configuration loaded from TOML files, exposing every
//! analysis constant (frame rate, screen geometry, frequency bands,
//! classification cut-offs) as an operator-tunable value.
//!
//! ## Loading Order
//!
//! 1. `NYSTAGMUS_CONFIG` environment variable (path to TOML file)
//! 2. `nystagmus.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(AnalysisConfig::load());
//!
//! // Anywhere in the codebase:
//! let fps = config::get().sampling.fps;
//! ```
//!
//! Library entry points take `&AnalysisConfig` explicitly; the global is a
//! convenience for binaries.

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;

use std::sync::OnceLock;

/// Global analysis configuration, initialized once at startup.
static ANALYSIS_CONFIG: OnceLock<AnalysisConfig> = OnceLock::new();

/// Initialize the global analysis configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AnalysisConfig) {
    if ANALYSIS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global analysis configuration.
///
/// Falls back to built-in defaults when `init()` was never called.
pub fn get() -> &'static AnalysisConfig {
    ANALYSIS_CONFIG.get_or_init(|| {
        tracing::debug!("config::get() before init(), using built-in defaults");
        AnalysisConfig::default()
    })
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ANALYSIS_CONFIG.get().is_some()
}
