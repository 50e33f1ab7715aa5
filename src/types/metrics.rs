//! Prediction error records.

use serde::{Deserialize, Serialize};

/// Location and spread of a non-negative error series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation
    pub std: f64,
    /// `1.96 * std / sqrt(n)`
    pub ci95_half_width: f64,
}

/// Error statistics for one coordinate axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisErrorStats {
    /// mean |predicted - actual|
    pub mae: f64,
    /// mean(predicted - actual)
    pub bias: f64,
    /// sample std of the signed error
    pub error_std: f64,
    pub rmse: f64,
    pub mse: f64,
    /// Pearson r between actual and predicted, 0 when undefined
    pub correlation: f64,
    /// Two-sided p-value of `correlation`
    pub correlation_p_value: f64,
    /// `1 - SS_res / SS_tot`, 0 when the actual series is constant
    pub r_squared: f64,
    /// `1 - ||a - p|| / ||a - mean(a)||`, unclamped
    pub nrmse: f64,
    /// `rmse / range(actual)`, 0 when the range is zero
    pub range_nrmse: f64,
}

/// Share of samples whose error is within a pixel threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionBand {
    pub threshold_px: f64,
    pub percent: f64,
}

/// Error expressed as visual angle (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAngleStats {
    pub mean_deg: f64,
    pub median_deg: f64,
    pub max_deg: f64,
    pub pixels_per_cm: f64,
}

/// Step-to-step movement of the predicted series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSmoothness {
    /// mean |first difference|
    pub mean_step: f64,
    /// std |first difference|, the jitter
    pub jitter: f64,
}

/// Direction of the two-axis error vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorAngleStats {
    pub mean_deg: f64,
    pub std_deg: f64,
}

/// Summary of the error column logged by the upstream predictor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggedErrorSummary {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
}

/// Summary of the logged signed X error column (`actual - predicted`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggedAxisError {
    /// Mean of the logged signed error (px)
    pub bias: f64,
    pub mean_abs: f64,
    pub max_abs: f64,
    /// Mean |logged - (actual - predicted)|, 0 when the column matches the positions
    pub agreement_px: f64,
}

/// Path length comparison between actual and predicted trajectories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryComparison {
    /// Sum of step distances of the actual trace (px)
    pub actual_path_length: f64,
    pub predicted_path_length: f64,
    /// |actual - predicted| path length (px)
    pub path_length_error: f64,
    /// Mean step distance per frame (px/frame)
    pub actual_mean_step: f64,
    pub predicted_mean_step: f64,
}

// ============================================================================
// Quality Grades
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NrmseGrade {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanErrorGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl std::fmt::Display for NrmseGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::VeryGood => write!(f, "very good"),
            Self::Good => write!(f, "good"),
            Self::Acceptable => write!(f, "acceptable"),
            Self::NeedsImprovement => write!(f, "needs improvement"),
        }
    }
}

impl std::fmt::Display for OverallGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

impl std::fmt::Display for MeanErrorGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
            Self::VeryPoor => write!(f, "very poor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub nrmse_grade: NrmseGrade,
    /// Points out of 5
    pub composite_score: u8,
    pub overall: OverallGrade,
    pub mean_error_grade: MeanErrorGrade,
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Per-sample error series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointwiseErrors {
    /// Euclidean distance (|error_x| for single-axis traces)
    pub euclidean: Vec<f64>,
    /// predicted - actual
    pub error_x: Vec<f64>,
    pub error_y: Option<Vec<f64>>,
    /// atan2(error_y, error_x) in degrees, two-axis traces only
    pub angle_deg: Option<Vec<f64>>,
    /// Euclidean error as % of the screen width (one axis) or diagonal (two axes)
    pub relative_percent: Vec<f64>,
    /// Centered rolling mean of the Euclidean error, `None` at the edges
    pub trend: Option<Vec<Option<f64>>>,
}

/// Aggregate prediction-error statistics for one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub samples: usize,
    pub pointwise: PointwiseErrors,
    pub euclidean: ErrorSummary,
    pub x: AxisErrorStats,
    pub y: Option<AxisErrorStats>,
    /// RMSE of the Euclidean error
    pub rmse: f64,
    /// Mean Euclidean error
    pub mae: f64,
    /// Corrected NRMSE over all axes, 0 when the actual trace is constant
    pub nrmse: f64,
    pub precision: Vec<PrecisionBand>,
    pub visual_angle: VisualAngleStats,
    pub smoothness: PredictionSmoothness,
    pub relative_error_mean_percent: f64,
    pub error_angle: Option<ErrorAngleStats>,
    pub logged: Option<LoggedErrorSummary>,
    pub logged_x: Option<LoggedAxisError>,
    pub trajectory: TrajectoryComparison,
    pub quality: QualityAssessment,
}

impl ErrorMetrics {
    /// Percentage of samples within `threshold_px`, if that band was computed.
    pub fn within(&self, threshold_px: f64) -> Option<f64> {
        self.precision
            .iter()
            .find(|b| (b.threshold_px - threshold_px).abs() < f64::EPSILON)
            .map(|b| b.percent)
    }
}
