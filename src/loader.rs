//! Gaze CSV Loader
//!
//! Reads logged gaze-prediction recordings into a `GazeTrace`. Two header
//! layouts are recognized:
//!
//! **Planar:** `GazeX, GazeY, pGazeX, pGazeY` with an optional frame id.
//!
//! **Horizontal:** `frameId, actualX, predictedX` with optional
//! `predictionErrorX` and `errorMagnitude` columns.
//!
//! The layout is detected from the header row. Rows with a missing or
//! non-numeric required value, and rows where the actual position is
//! exactly zero, are dropped before samples are indexed.
//!
//! # Usage
//!
//! ```ignore
//! use nystagmus_analyzer::loader;
//!
//! let trace = loader::load_trace("session.csv", 60.0)?;
//! println!("{} samples, {} dropped", trace.len(), trace.dropped_rows);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::{GazeTrace, InputLayout, RawGazeRow};

/// Spreadsheet extensions that must be converted to CSV first.
const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "ods"];

/// Fatal errors while reading a recording.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required {layout} columns: {}", missing.join(", "))]
    MissingColumns {
        layout: InputLayout,
        missing: Vec<String>,
    },

    #[error("Unsupported input format '{0}', export the sheet as CSV")]
    UnsupportedFormat(String),

    #[error("Empty file: no header row")]
    EmptyFile,

    #[error("No valid samples ({dropped} rows dropped)")]
    NoValidSamples { dropped: usize },
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.clone());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Maps header names to column indices.
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    frame_id: Option<usize>,
    actual_x: Option<usize>,
    actual_y: Option<usize>,
    predicted_x: Option<usize>,
    predicted_y: Option<usize>,
    logged_error_x: Option<usize>,
    logged_error_magnitude: Option<usize>,
}

impl ColumnMap {
    /// Build the column map and detect the layout from the header row.
    fn from_header(header: &str) -> Result<(InputLayout, Self), LoadError> {
        let columns = csv_split(header.trim_start_matches('\u{feff}'));
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c.trim().eq_ignore_ascii_case(name))
        };

        let planar = Self {
            frame_id: find("frameId").or_else(|| find("frame_id")),
            actual_x: find("GazeX"),
            actual_y: find("GazeY"),
            predicted_x: find("pGazeX"),
            predicted_y: find("pGazeY"),
            logged_error_x: None,
            logged_error_magnitude: None,
        };
        let horizontal = Self {
            frame_id: find("frameId").or_else(|| find("frame_id")),
            actual_x: find("actualX"),
            actual_y: None,
            predicted_x: find("predictedX"),
            predicted_y: None,
            logged_error_x: find("predictionErrorX"),
            logged_error_magnitude: find("errorMagnitude"),
        };

        let planar_missing = planar.missing(InputLayout::Planar);
        if planar_missing.is_empty() {
            return Ok((InputLayout::Planar, planar));
        }
        let horizontal_missing = horizontal.missing(InputLayout::Horizontal);
        if horizontal_missing.is_empty() {
            return Ok((InputLayout::Horizontal, horizontal));
        }

        // Report against the layout the header resembles more
        let (layout, missing) = if planar_missing.len() < horizontal_missing.len() {
            (InputLayout::Planar, planar_missing)
        } else {
            (InputLayout::Horizontal, horizontal_missing)
        };
        Err(LoadError::MissingColumns { layout, missing })
    }

    fn missing(&self, layout: InputLayout) -> Vec<String> {
        let required: &[(&str, Option<usize>)] = match layout {
            InputLayout::Planar => &[
                ("GazeX", self.actual_x),
                ("GazeY", self.actual_y),
                ("pGazeX", self.predicted_x),
                ("pGazeY", self.predicted_y),
            ],
            InputLayout::Horizontal => &[
                ("frameId", self.frame_id),
                ("actualX", self.actual_x),
                ("predictedX", self.predicted_x),
            ],
        };
        required
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn parse_row(&self, fields: &[&str]) -> RawGazeRow {
        RawGazeRow {
            frame_id: get_f64(fields, self.frame_id).map(|v| v as i64),
            actual_x: get_f64(fields, self.actual_x),
            actual_y: get_f64(fields, self.actual_y),
            predicted_x: get_f64(fields, self.predicted_x),
            predicted_y: get_f64(fields, self.predicted_y),
            logged_error_x: get_f64(fields, self.logged_error_x),
            logged_error_magnitude: get_f64(fields, self.logged_error_magnitude),
        }
    }
}

/// Get a finite f64 field by optional column index; blanks, text and NaN are missing.
fn get_f64(fields: &[&str], idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| fields.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// ============================================================================
// Loading
// ============================================================================

/// Load a recording from disk.
pub fn load_trace(path: impl AsRef<Path>, fps: f64) -> Result<GazeTrace, LoadError> {
    let path = path.as_ref();

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            return Err(LoadError::UnsupportedFormat(ext));
        }
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let trace = read_trace(BufReader::new(file), fps).map_err(|e| match e {
        LoadError::Io { source, .. } => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    tracing::info!(
        file = %path.display(),
        layout = %trace.layout,
        samples = trace.len(),
        dropped = trace.dropped_rows,
        duration_secs = trace.duration_secs(),
        "Recording loaded"
    );
    Ok(trace)
}

/// Parse a recording from any buffered reader.
pub fn read_trace<R: BufRead>(reader: R, fps: f64) -> Result<GazeTrace, LoadError> {
    let mut lines = reader.lines();
    let io_err = |source| LoadError::Io {
        path: PathBuf::new(),
        source,
    };

    let header = loop {
        match lines.next() {
            None => return Err(LoadError::EmptyFile),
            Some(line) => {
                let line = line.map_err(io_err)?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
        }
    };

    let (layout, columns) = ColumnMap::from_header(&header)?;
    tracing::debug!(%layout, ?columns, "Detected column layout");

    let mut rows = Vec::new();
    for line in lines {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = csv_split(&line);
        let refs: Vec<&str> = fields.iter().map(|s| s.as_str()).collect();
        rows.push(columns.parse_row(&refs));
    }

    let trace = GazeTrace::from_rows(layout, fps, rows);
    if trace.dropped_rows > 0 {
        tracing::warn!(
            dropped = trace.dropped_rows,
            kept = trace.len(),
            "Dropped rows with missing values or zero gaze"
        );
    }
    if trace.is_empty() {
        return Err(LoadError::NoValidSamples {
            dropped: trace.dropped_rows,
        });
    }
    Ok(trace)
}
