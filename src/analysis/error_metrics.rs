//! Error Metrics Engine
//!
//! Compares actual and predicted gaze positions sample by sample and
//! aggregates the differences into accuracy, precision, visual-angle,
//! smoothness and quality figures.
//!
//! Signed errors are `predicted - actual`. Every aggregate falls back to 0
//! on empty or degenerate input.

use crate::config::defaults::{CI95_Z, ERROR_TREND_DIVISOR, ERROR_TREND_MAX_WINDOW, NEAR_ZERO};
use crate::config::{PrecisionConfig, ScreenConfig};
use crate::processing::stats;
use crate::types::thresholds::quality_thresholds as qt;
use crate::types::{
    AxisErrorStats, ErrorAngleStats, ErrorMetrics, ErrorSummary, GazeTrace, LoggedAxisError, LoggedErrorSummary,
    MeanErrorGrade, NrmseGrade, OverallGrade, PointwiseErrors, PrecisionBand,
    PredictionSmoothness, QualityAssessment, TrajectoryComparison, VisualAngleStats,
};

/// Actual and predicted series of one axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisSeries<'a> {
    pub actual: &'a [f64],
    pub predicted: &'a [f64],
}

impl<'a> AxisSeries<'a> {
    pub fn new(actual: &'a [f64], predicted: &'a [f64]) -> Self {
        Self { actual, predicted }
    }

    fn len(&self) -> usize {
        self.actual.len().min(self.predicted.len())
    }

    /// predicted - actual
    fn signed_errors(&self) -> Vec<f64> {
        self.actual
            .iter()
            .zip(self.predicted)
            .map(|(a, p)| p - a)
            .collect()
    }
}

/// Error columns logged by the upstream predictor, when the recording has them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggedErrors<'a> {
    /// `errorMagnitude`
    pub magnitude: Option<&'a [f64]>,
    /// `predictionErrorX`, signed `actual - predicted`
    pub error_x: Option<&'a [f64]>,
}

pub struct ErrorMetricsEngine<'a> {
    screen: &'a ScreenConfig,
    precision: &'a PrecisionConfig,
}

impl<'a> ErrorMetricsEngine<'a> {
    pub fn new(screen: &'a ScreenConfig, precision: &'a PrecisionConfig) -> Self {
        Self { screen, precision }
    }

    /// Metrics for a loaded trace, including the logged error column if any.
    pub fn analyze_trace(&self, trace: &GazeTrace) -> ErrorMetrics {
        let actual_x = trace.actual_x();
        let predicted_x = trace.predicted_x();
        let actual_y = trace.actual_y();
        let predicted_y = trace.predicted_y();
        let magnitude = trace.logged_error_magnitude();
        let error_x = trace.logged_error_x();
        let logged = LoggedErrors {
            magnitude: magnitude.as_deref(),
            error_x: error_x.as_deref(),
        };

        let y = match (&actual_y, &predicted_y) {
            (Some(a), Some(p)) => Some(AxisSeries::new(a, p)),
            _ => None,
        };
        self.compute(AxisSeries::new(&actual_x, &predicted_x), y, logged)
    }

    /// Metrics for one axis (`y == None`) or two axes.
    pub fn compute(
        &self,
        x: AxisSeries<'_>,
        y: Option<AxisSeries<'_>>,
        logged: LoggedErrors<'_>,
    ) -> ErrorMetrics {
        let n = y.map_or(x.len(), |y| x.len().min(y.len()));
        let x = AxisSeries::new(&x.actual[..n], &x.predicted[..n]);
        let y = y.map(|y| AxisSeries::new(&y.actual[..n], &y.predicted[..n]));

        let pointwise = self.pointwise(x, y);
        let euclidean = summarize(&pointwise.euclidean);

        let x_stats = axis_stats(x);
        let y_stats = y.map(axis_stats);

        let squared: Vec<f64> = pointwise.euclidean.iter().map(|e| e * e).collect();
        let rmse = stats::mean(&squared).sqrt();
        let nrmse = stacked_nrmse(x, y);

        let precision = self
            .precision
            .thresholds_px
            .iter()
            .map(|&t| PrecisionBand {
                threshold_px: t,
                percent: within_percent(&pointwise.euclidean, t),
            })
            .collect();

        let visual_angle = self.visual_angle(&pointwise.euclidean);
        let smoothness = prediction_smoothness(x.predicted, y.map(|y| y.predicted));
        let relative_error_mean_percent = stats::mean(&pointwise.relative_percent);

        let error_angle = pointwise.angle_deg.as_ref().map(|angles| ErrorAngleStats {
            mean_deg: stats::mean(angles),
            std_deg: stats::population_std(angles),
        });

        let logged_x = logged
            .error_x
            .filter(|l| !l.is_empty())
            .map(|l| logged_axis_error(l, &pointwise.error_x));
        let logged = logged.magnitude.filter(|l| !l.is_empty()).map(|l| LoggedErrorSummary {
            mean: stats::mean(l),
            median: stats::median(l),
            max: stats::max(l),
        });

        let trajectory = trajectory_comparison(x, y);

        let mean_correlation = mean_over_axes(x_stats.correlation, y_stats.map(|s| s.correlation));
        let mean_r_squared = mean_over_axes(x_stats.r_squared, y_stats.map(|s| s.r_squared));
        let quality = assess_quality(
            nrmse,
            mean_correlation,
            mean_r_squared,
            within_percent(&pointwise.euclidean, qt::COMPOSITE_PRECISION_PX),
            euclidean.mean,
        );

        tracing::debug!(
            samples = n,
            mean_error_px = euclidean.mean,
            rmse = rmse,
            nrmse = nrmse,
            correlation = mean_correlation,
            quality = %quality.overall,
            "Error metrics computed"
        );

        ErrorMetrics {
            samples: n,
            pointwise,
            euclidean,
            x: x_stats,
            y: y_stats,
            rmse,
            mae: euclidean.mean,
            nrmse,
            precision,
            visual_angle,
            smoothness,
            relative_error_mean_percent,
            error_angle,
            logged,
            logged_x,
            trajectory,
            quality,
        }
    }

    fn pointwise(&self, x: AxisSeries<'_>, y: Option<AxisSeries<'_>>) -> PointwiseErrors {
        let error_x = x.signed_errors();
        let error_y = y.map(|y| y.signed_errors());

        let (euclidean, angle_deg, reference) = match &error_y {
            Some(ey) => (
                error_x.iter().zip(ey).map(|(dx, dy)| dx.hypot(*dy)).collect::<Vec<_>>(),
                Some(
                    error_x
                        .iter()
                        .zip(ey)
                        .map(|(dx, dy)| dy.atan2(*dx).to_degrees())
                        .collect(),
                ),
                self.screen.diagonal_px(),
            ),
            None => (
                error_x.iter().map(|e| e.abs()).collect(),
                None,
                self.screen.width_px,
            ),
        };

        let relative_percent = euclidean
            .iter()
            .map(|e| if reference > 0.0 { e / reference * 100.0 } else { 0.0 })
            .collect();

        let window = ERROR_TREND_MAX_WINDOW.min(euclidean.len() / ERROR_TREND_DIVISOR);
        let trend = (window > 1).then(|| stats::rolling_mean_centered(&euclidean, window));

        PointwiseErrors {
            euclidean,
            error_x,
            error_y,
            angle_deg,
            relative_percent,
            trend,
        }
    }

    /// Visual angle subtended by each error at the configured viewing distance.
    fn visual_angle(&self, errors: &[f64]) -> VisualAngleStats {
        let ppcm = self.screen.pixels_per_cm();
        let distance = self.screen.viewing_distance_cm;
        let angles: Vec<f64> = errors
            .iter()
            .map(|&e| visual_angle_deg(e, ppcm, distance))
            .collect();

        VisualAngleStats {
            mean_deg: stats::mean(&angles),
            median_deg: stats::median(&angles),
            max_deg: stats::max(&angles),
            pixels_per_cm: ppcm,
        }
    }
}

/// `2 atan((e / ppcm) / (2 d))` in degrees.
pub fn visual_angle_deg(error_px: f64, pixels_per_cm: f64, distance_cm: f64) -> f64 {
    if pixels_per_cm <= 0.0 || distance_cm <= 0.0 {
        return 0.0;
    }
    (2.0 * ((error_px / pixels_per_cm) / (2.0 * distance_cm)).atan()).to_degrees()
}

/// Compares the logged `actual - predicted` column with the `predicted - actual`
/// errors computed from positions.
fn logged_axis_error(logged: &[f64], computed: &[f64]) -> LoggedAxisError {
    let abs: Vec<f64> = logged.iter().map(|e| e.abs()).collect();
    let disagreement: Vec<f64> = logged
        .iter()
        .zip(computed)
        .map(|(l, c)| (l + c).abs())
        .collect();
    LoggedAxisError {
        bias: stats::mean(logged),
        mean_abs: stats::mean(&abs),
        max_abs: stats::max(&abs),
        agreement_px: stats::mean(&disagreement),
    }
}

fn summarize(errors: &[f64]) -> ErrorSummary {
    if errors.is_empty() {
        return ErrorSummary::default();
    }
    let std = stats::sample_std(errors);
    ErrorSummary {
        mean: stats::mean(errors),
        median: stats::median(errors),
        min: stats::min(errors),
        max: stats::max(errors),
        std,
        ci95_half_width: CI95_Z * std / (errors.len() as f64).sqrt(),
    }
}

fn axis_stats(axis: AxisSeries<'_>) -> AxisErrorStats {
    let n = axis.len();
    if n == 0 {
        return AxisErrorStats::default();
    }

    let errors = axis.signed_errors();
    let abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / n as f64;

    let correlation = stats::pearson(axis.actual, axis.predicted);
    let range = stats::range(axis.actual);
    let rmse = mse.sqrt();

    AxisErrorStats {
        mae: stats::mean(&abs_errors),
        bias: stats::mean(&errors),
        error_std: stats::sample_std(&errors),
        rmse,
        mse,
        correlation,
        correlation_p_value: stats::pearson_p_value(correlation, n),
        r_squared: r_squared(axis),
        nrmse: corrected_nrmse(&[axis]),
        range_nrmse: if range > NEAR_ZERO { rmse / range } else { 0.0 },
    }
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// 0 when the actual series is constant.
pub fn r_squared(axis: AxisSeries<'_>) -> f64 {
    let mean = stats::mean(axis.actual);
    let ss_tot: f64 = axis.actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot <= NEAR_ZERO {
        return 0.0;
    }
    let ss_res: f64 = axis
        .actual
        .iter()
        .zip(axis.predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// `1 - ||a - p|| / ||a - mean(a)||` over the concatenated axes.
///
/// Each axis is centered on its own mean. Unclamped; 0 when the actual
/// trace has no spread.
pub fn corrected_nrmse(axes: &[AxisSeries<'_>]) -> f64 {
    let mut residual = 0.0;
    let mut spread = 0.0;
    for axis in axes {
        let mean = stats::mean(axis.actual);
        for (a, p) in axis.actual.iter().zip(axis.predicted) {
            residual += (a - p).powi(2);
            spread += (a - mean).powi(2);
        }
    }

    let denominator = spread.sqrt();
    if denominator <= NEAR_ZERO {
        return 0.0;
    }
    1.0 - residual.sqrt() / denominator
}

fn stacked_nrmse(x: AxisSeries<'_>, y: Option<AxisSeries<'_>>) -> f64 {
    match y {
        Some(y) => corrected_nrmse(&[x, y]),
        None => corrected_nrmse(&[x]),
    }
}

fn within_percent(errors: &[f64], threshold: f64) -> f64 {
    stats::fraction(errors, |e| e <= threshold) * 100.0
}

fn mean_over_axes(x: f64, y: Option<f64>) -> f64 {
    match y {
        Some(y) => (x + y) / 2.0,
        None => x,
    }
}

/// Step distances of a one- or two-axis path.
fn step_distances(x: &[f64], y: Option<&[f64]>) -> Vec<f64> {
    match y {
        Some(y) => x
            .windows(2)
            .zip(y.windows(2))
            .map(|(wx, wy)| (wx[1] - wx[0]).hypot(wy[1] - wy[0]))
            .collect(),
        None => stats::diff(x).iter().map(|d| d.abs()).collect(),
    }
}

/// Mean step and jitter (population std of the step) of the predicted path.
fn prediction_smoothness(x: &[f64], y: Option<&[f64]>) -> PredictionSmoothness {
    if x.len() < 2 {
        return PredictionSmoothness::default();
    }
    let steps = step_distances(x, y);
    PredictionSmoothness {
        mean_step: stats::mean(&steps),
        jitter: stats::population_std(&steps),
    }
}

fn trajectory_comparison(x: AxisSeries<'_>, y: Option<AxisSeries<'_>>) -> TrajectoryComparison {
    let n = x.len();
    if n == 0 {
        return TrajectoryComparison::default();
    }

    let actual_path_length: f64 = step_distances(x.actual, y.map(|y| y.actual)).iter().sum();
    let predicted_path_length: f64 =
        step_distances(x.predicted, y.map(|y| y.predicted)).iter().sum();

    TrajectoryComparison {
        actual_path_length,
        predicted_path_length,
        path_length_error: (actual_path_length - predicted_path_length).abs(),
        actual_mean_step: actual_path_length / n as f64,
        predicted_mean_step: predicted_path_length / n as f64,
    }
}

// ============================================================================
// Quality Grades
// ============================================================================

pub fn grade_nrmse(nrmse: f64) -> NrmseGrade {
    if nrmse > qt::NRMSE_EXCELLENT {
        NrmseGrade::Excellent
    } else if nrmse > qt::NRMSE_VERY_GOOD {
        NrmseGrade::VeryGood
    } else if nrmse > qt::NRMSE_GOOD {
        NrmseGrade::Good
    } else if nrmse > qt::NRMSE_ACCEPTABLE {
        NrmseGrade::Acceptable
    } else {
        NrmseGrade::NeedsImprovement
    }
}

pub fn grade_mean_error(mean_error_px: f64) -> MeanErrorGrade {
    if mean_error_px < qt::MEAN_ERROR_EXCELLENT {
        MeanErrorGrade::Excellent
    } else if mean_error_px < qt::MEAN_ERROR_GOOD {
        MeanErrorGrade::Good
    } else if mean_error_px < qt::MEAN_ERROR_FAIR {
        MeanErrorGrade::Fair
    } else if mean_error_px < qt::MEAN_ERROR_POOR {
        MeanErrorGrade::Poor
    } else {
        MeanErrorGrade::VeryPoor
    }
}

/// One point per satisfied criterion, then a four-level grade.
pub fn assess_quality(
    nrmse: f64,
    correlation: f64,
    r_squared: f64,
    within_precision_percent: f64,
    mean_error_px: f64,
) -> QualityAssessment {
    let criteria = [
        nrmse > qt::COMPOSITE_NRMSE,
        correlation > qt::COMPOSITE_CORRELATION,
        r_squared > qt::COMPOSITE_R_SQUARED,
        within_precision_percent > qt::COMPOSITE_PRECISION_PERCENT,
        mean_error_px < qt::COMPOSITE_MEAN_ERROR_PX,
    ];
    let composite_score = criteria.iter().filter(|&&ok| ok).count() as u8;

    let overall = if composite_score >= qt::OVERALL_EXCELLENT_POINTS {
        OverallGrade::Excellent
    } else if composite_score >= qt::OVERALL_GOOD_POINTS {
        OverallGrade::Good
    } else if composite_score >= qt::OVERALL_FAIR_POINTS {
        OverallGrade::Fair
    } else {
        OverallGrade::Poor
    };

    QualityAssessment {
        nrmse_grade: grade_nrmse(nrmse),
        composite_score,
        overall,
        mean_error_grade: grade_mean_error(mean_error_px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_parts() -> (ScreenConfig, PrecisionConfig) {
        (ScreenConfig::default(), PrecisionConfig::default())
    }

    #[test]
    fn test_perfect_prediction() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let actual: Vec<f64> = (0..50).map(|i| 900.0 + (i as f64 * 0.4).sin() * 30.0).collect();

        let m = engine.compute(AxisSeries::new(&actual, &actual), None, LoggedErrors::default());
        assert_eq!(m.euclidean.mean, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert!((m.nrmse - 1.0).abs() < 1e-12, "perfect prediction has NRMSE 1");
        assert!((m.x.correlation - 1.0).abs() < 1e-12);
        assert!((m.x.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(m.within(1.0), Some(100.0));
        assert_eq!(m.quality.overall, OverallGrade::Excellent);
        assert_eq!(m.quality.composite_score, 5);
    }

    #[test]
    fn test_constant_offset_is_bias() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let actual: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let predicted: Vec<f64> = actual.iter().map(|a| a + 3.0).collect();

        let m = engine.compute(AxisSeries::new(&actual, &predicted), None, LoggedErrors::default());
        assert!((m.x.bias - 3.0).abs() < 1e-12, "predicted - actual");
        assert!((m.x.mae - 3.0).abs() < 1e-12);
        assert!((m.x.rmse - 3.0).abs() < 1e-12);
        assert!(m.x.error_std.abs() < 1e-12);
        assert_eq!(m.within(2.0), Some(0.0));
        assert_eq!(m.within(3.0), Some(100.0));
        assert!((m.trajectory.path_length_error).abs() < 1e-12);
    }

    #[test]
    fn test_constant_actual_is_degenerate() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let actual = [500.0; 20];
        let predicted: Vec<f64> = (0..20).map(|i| 500.0 + i as f64).collect();

        let m = engine.compute(AxisSeries::new(&actual, &predicted), None, LoggedErrors::default());
        assert_eq!(m.nrmse, 0.0);
        assert_eq!(m.x.r_squared, 0.0);
        assert_eq!(m.x.correlation, 0.0);
        assert_eq!(m.x.range_nrmse, 0.0);
    }

    #[test]
    fn test_nrmse_can_be_negative() {
        let actual = [0.0, 1.0, 0.0, 1.0];
        let predicted = [1.0, 0.0, 1.0, 0.0];
        let nrmse = corrected_nrmse(&[AxisSeries::new(&actual, &predicted)]);
        // ||a - p|| = 2, ||a - mean|| = 1
        assert!((nrmse + 1.0).abs() < 1e-12, "got {nrmse}");
    }

    #[test]
    fn test_planar_errors() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let ax = [100.0, 110.0, 120.0];
        let ay = [200.0, 200.0, 200.0];
        let px = [103.0, 113.0, 123.0];
        let py = [204.0, 204.0, 204.0];

        let m = engine.compute(
            AxisSeries::new(&ax, &px),
            Some(AxisSeries::new(&ay, &py)),
            LoggedErrors {
                magnitude: Some(&[4.0, 6.0, 5.0]),
                error_x: None,
            },
        );
        assert_eq!(m.pointwise.euclidean, vec![5.0, 5.0, 5.0]);
        let angle = m.error_angle.expect("two-axis input has an error angle");
        assert!((angle.mean_deg - 4.0_f64.atan2(3.0).to_degrees()).abs() < 1e-9);
        assert_eq!(m.logged.map(|l| l.max), Some(6.0));
        assert!(m.logged_x.is_none());
        assert!((m.smoothness.mean_step - 10.0).abs() < 1e-12);
        assert!((m.trajectory.actual_path_length - 20.0).abs() < 1e-12);
        assert!(m.y.is_some());
    }

    #[test]
    fn test_visual_angle() {
        let ppcm = 96.0 / 2.54;
        // 1 cm at 60 cm is about 0.955 degrees
        let deg = visual_angle_deg(ppcm, ppcm, 60.0);
        assert!((deg - 0.954_907).abs() < 1e-5, "got {deg}");
        assert_eq!(visual_angle_deg(0.0, ppcm, 60.0), 0.0);
    }

    #[test]
    fn test_trend_window() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let short: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let m = engine.compute(AxisSeries::new(&short, &short), None, LoggedErrors::default());
        assert!(m.pointwise.trend.is_none(), "window 30/20 = 1 is skipped");

        let long: Vec<f64> = (0..400).map(|i| i as f64).collect();
        let m = engine.compute(AxisSeries::new(&long, &long), None, LoggedErrors::default());
        let trend = m.pointwise.trend.expect("trend for 400 samples");
        assert_eq!(trend.len(), 400);
        assert!(trend[0].is_none());
        assert_eq!(trend[200], Some(0.0));
    }

    #[test]
    fn test_empty_input() {
        let (screen, precision) = engine_parts();
        let engine = ErrorMetricsEngine::new(&screen, &precision);
        let m = engine.compute(AxisSeries::new(&[], &[]), None, LoggedErrors::default());
        assert_eq!(m.samples, 0);
        assert_eq!(m.euclidean, ErrorSummary::default());
        assert_eq!(m.nrmse, 0.0);
    }

    #[test]
    fn test_quality_grades() {
        assert_eq!(grade_nrmse(0.9), NrmseGrade::Excellent);
        assert_eq!(grade_nrmse(0.8), NrmseGrade::VeryGood);
        assert_eq!(grade_nrmse(0.7), NrmseGrade::Good);
        assert_eq!(grade_nrmse(0.5), NrmseGrade::Acceptable);
        assert_eq!(grade_nrmse(-0.2), NrmseGrade::NeedsImprovement);

        assert_eq!(grade_mean_error(10.0), MeanErrorGrade::Excellent);
        assert_eq!(grade_mean_error(59.0), MeanErrorGrade::Poor);
        assert_eq!(grade_mean_error(60.0), MeanErrorGrade::VeryPoor);

        let q = assess_quality(0.7, 0.9, 0.5, 20.0, 30.0);
        assert_eq!(q.composite_score, 2);
        assert_eq!(q.overall, OverallGrade::Fair);
    }
}
