//! Gaze samples and the filtered trace the analysis runs on.

use serde::{Deserialize, Serialize};

/// Column layout of a gaze recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputLayout {
    /// `GazeX, GazeY, pGazeX, pGazeY`
    Planar,
    /// `frameId, actualX, predictedX` with optional logged error columns
    Horizontal,
}

impl InputLayout {
    pub fn is_planar(self) -> bool {
        matches!(self, Self::Planar)
    }
}

impl std::fmt::Display for InputLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planar => write!(f, "planar (x/y)"),
            Self::Horizontal => write!(f, "horizontal (x only)"),
        }
    }
}

/// One row as read from the source table, before validation.
///
/// `None` marks an empty or non-numeric cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGazeRow {
    pub frame_id: Option<i64>,
    pub actual_x: Option<f64>,
    pub actual_y: Option<f64>,
    pub predicted_x: Option<f64>,
    pub predicted_y: Option<f64>,
    pub logged_error_x: Option<f64>,
    pub logged_error_magnitude: Option<f64>,
}

/// A validated gaze observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Dense zero-based position after invalid rows were dropped
    pub index: usize,
    /// `index / fps` in seconds
    pub timestamp: f64,
    pub actual_x: f64,
    pub actual_y: Option<f64>,
    pub predicted_x: f64,
    pub predicted_y: Option<f64>,
    /// Frame id from the source file, if it had one
    pub frame_id: Option<i64>,
    /// Upstream-logged signed X error, if present
    pub logged_error_x: Option<f64>,
    /// Upstream-logged error magnitude, if present
    pub logged_error_magnitude: Option<f64>,
}

/// Why a raw row was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowRejection {
    MissingValue,
    ZeroActual,
}

/// Ordered, validated gaze samples for one recording.
///
/// Immutable after construction; indices are dense `0..len`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeTrace {
    pub layout: InputLayout,
    pub fps: f64,
    samples: Vec<GazeSample>,
    /// Rows dropped as missing or all-zero
    pub dropped_rows: usize,
}

impl GazeTrace {
    /// Build a trace from raw rows, dropping invalid ones and reindexing.
    ///
    /// A row is dropped when a required value is missing or when every
    /// actual coordinate is exactly zero (tracker lost the eye).
    pub fn from_rows<I>(layout: InputLayout, fps: f64, rows: I) -> Self
    where
        I: IntoIterator<Item = RawGazeRow>,
    {
        let mut samples = Vec::new();
        let mut dropped_rows = 0;

        for row in rows {
            match Self::validate(layout, &row) {
                Ok((actual_x, actual_y, predicted_x, predicted_y)) => {
                    let index = samples.len();
                    samples.push(GazeSample {
                        index,
                        timestamp: index as f64 / fps,
                        actual_x,
                        actual_y,
                        predicted_x,
                        predicted_y,
                        frame_id: row.frame_id,
                        logged_error_x: row.logged_error_x,
                        logged_error_magnitude: row.logged_error_magnitude,
                    });
                }
                Err(reason) => {
                    tracing::trace!(?reason, frame_id = ?row.frame_id, "Dropping gaze row");
                    dropped_rows += 1;
                }
            }
        }

        Self {
            layout,
            fps,
            samples,
            dropped_rows,
        }
    }

    #[allow(clippy::type_complexity)]
    fn validate(
        layout: InputLayout,
        row: &RawGazeRow,
    ) -> Result<(f64, Option<f64>, f64, Option<f64>), RowRejection> {
        let (Some(ax), Some(px)) = (row.actual_x, row.predicted_x) else {
            return Err(RowRejection::MissingValue);
        };

        match layout {
            InputLayout::Planar => {
                let (Some(ay), Some(py)) = (row.actual_y, row.predicted_y) else {
                    return Err(RowRejection::MissingValue);
                };
                if ax == 0.0 && ay == 0.0 {
                    return Err(RowRejection::ZeroActual);
                }
                Ok((ax, Some(ay), px, Some(py)))
            }
            InputLayout::Horizontal => {
                if ax == 0.0 {
                    return Err(RowRejection::ZeroActual);
                }
                Ok((ax, None, px, None))
            }
        }
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_planar(&self) -> bool {
        self.layout.is_planar()
    }

    /// Recording length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.fps
    }

    pub fn actual_x(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.actual_x).collect()
    }

    pub fn predicted_x(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.predicted_x).collect()
    }

    /// Actual Y series, `None` for single-axis recordings.
    pub fn actual_y(&self) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.actual_y).collect()
    }

    pub fn predicted_y(&self) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.predicted_y).collect()
    }

    /// Logged error magnitudes, only when every sample carries one.
    pub fn logged_error_magnitude(&self) -> Option<Vec<f64>> {
        if self.samples.is_empty() {
            return None;
        }
        self.samples.iter().map(|s| s.logged_error_magnitude).collect()
    }

    /// Logged signed X errors (`actual - predicted`), only when every sample carries one.
    pub fn logged_error_x(&self) -> Option<Vec<f64>> {
        if self.samples.is_empty() {
            return None;
        }
        self.samples.iter().map(|s| s.logged_error_x).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar_row(ax: f64, ay: f64) -> RawGazeRow {
        RawGazeRow {
            actual_x: Some(ax),
            actual_y: Some(ay),
            predicted_x: Some(ax + 1.0),
            predicted_y: Some(ay - 1.0),
            ..RawGazeRow::default()
        }
    }

    #[test]
    fn test_zero_rows_dropped_and_reindexed() {
        let rows: Vec<RawGazeRow> = (0..100)
            .map(|i| {
                if (10..15).contains(&i) {
                    planar_row(0.0, 0.0)
                } else {
                    planar_row(100.0 + i as f64, 50.0)
                }
            })
            .collect();

        let trace = GazeTrace::from_rows(InputLayout::Planar, 60.0, rows);
        assert_eq!(trace.len(), 95);
        assert_eq!(trace.dropped_rows, 5);
        for (i, s) in trace.samples().iter().enumerate() {
            assert_eq!(s.index, i, "index must be dense");
            assert!((s.timestamp - i as f64 / 60.0).abs() < 1e-12);
        }
        // Row 15 of the input becomes sample 10
        assert_eq!(trace.samples()[10].actual_x, 115.0);
    }

    #[test]
    fn test_single_zero_axis_is_kept() {
        let trace = GazeTrace::from_rows(
            InputLayout::Planar,
            60.0,
            vec![planar_row(0.0, 5.0), planar_row(5.0, 0.0)],
        );
        assert_eq!(trace.len(), 2, "only rows with both axes zero are invalid");
    }

    #[test]
    fn test_missing_values_dropped() {
        let mut missing_pred = planar_row(3.0, 4.0);
        missing_pred.predicted_y = None;
        let trace = GazeTrace::from_rows(
            InputLayout::Planar,
            60.0,
            vec![missing_pred, planar_row(3.0, 4.0)],
        );
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_horizontal_layout() {
        let rows = vec![
            RawGazeRow {
                frame_id: Some(7),
                actual_x: Some(0.0),
                predicted_x: Some(2.0),
                ..RawGazeRow::default()
            },
            RawGazeRow {
                frame_id: Some(8),
                actual_x: Some(10.0),
                predicted_x: Some(12.0),
                logged_error_x: Some(-2.0),
                logged_error_magnitude: Some(2.0),
                ..RawGazeRow::default()
            },
        ];
        let trace = GazeTrace::from_rows(InputLayout::Horizontal, 60.0, rows);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.samples()[0].frame_id, Some(8));
        assert!(trace.actual_y().is_none());
        assert_eq!(trace.logged_error_magnitude(), Some(vec![2.0]));
        assert_eq!(trace.logged_error_x(), Some(vec![-2.0]));
    }
}
