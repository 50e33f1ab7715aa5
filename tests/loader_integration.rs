//! Loader Integration Tests
//!
//! Writes recordings to temporary files and loads them through the public
//! file API, covering layout detection, row dropping and fatal errors.

use std::io::Write;

use nystagmus_analyzer::analysis::ErrorMetricsEngine;
use nystagmus_analyzer::config::AnalysisConfig;
use nystagmus_analyzer::loader::{load_trace, LoadError};
use nystagmus_analyzer::types::InputLayout;
use nystagmus_analyzer::SessionAnalyzer;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

fn planar_csv(rows: usize, zero_rows: std::ops::Range<usize>) -> String {
    let mut csv = String::from("GazeX,GazeY,pGazeX,pGazeY\n");
    for i in 0..rows {
        let (x, y) = if zero_rows.contains(&i) {
            (0.0, 0.0)
        } else {
            (900.0 + (i % 10) as f64 * 3.0, 500.0 + (i % 7) as f64)
        };
        csv.push_str(&format!("{x},{y},{},{}\n", x + 1.0, y - 1.0));
    }
    csv
}

#[test]
fn zero_gaze_rows_are_dropped_and_reindexed() {
    let file = write_temp(".csv", &planar_csv(100, 10..15));
    let trace = load_trace(file.path(), 60.0).expect("valid planar recording");

    assert_eq!(trace.layout, InputLayout::Planar);
    assert_eq!(trace.len(), 95, "rows 10-14 are tracking loss");
    assert_eq!(trace.dropped_rows, 5);
    for (expected, sample) in trace.samples().iter().enumerate() {
        assert_eq!(sample.index, expected, "indices are dense after dropping");
    }
    assert_eq!(trace.samples()[94].index, 94);
}

#[test]
fn horizontal_layout_with_logged_error_columns() {
    let mut csv = String::from("frameId,actualX,predictedX,predictionErrorX,errorMagnitude\n");
    for i in 0..50 {
        let a = 960.0 + (i % 6) as f64 * 4.0;
        csv.push_str(&format!("{i},{a},{},{},{}\n", a + 2.0, -2.0, 2.0));
    }
    let file = write_temp(".csv", &csv);
    let trace = load_trace(file.path(), 60.0).expect("valid horizontal recording");

    assert_eq!(trace.layout, InputLayout::Horizontal);
    assert_eq!(trace.len(), 50);
    assert!(trace.actual_y().is_none(), "horizontal recordings have no y axis");
    assert_eq!(trace.logged_error_magnitude().map(|v| v.len()), Some(50));
    assert_eq!(trace.logged_error_x().map(|v| v.len()), Some(50));
}

#[test]
fn logged_x_error_column_reaches_metrics() {
    // Predictor overshoots by 3 px on even frames and undershoots by 1 px on odd ones;
    // the logged column is actual - predicted
    let mut csv = String::from("frameId,actualX,predictedX,predictionErrorX\n");
    for i in 0..40 {
        let a = 900.0 + (i % 8) as f64 * 5.0;
        let offset = if i % 2 == 0 { 3.0 } else { -1.0 };
        csv.push_str(&format!("{i},{a},{},{}\n", a + offset, -offset));
    }
    let file = write_temp(".csv", &csv);
    let trace = load_trace(file.path(), 60.0).expect("valid horizontal recording");
    let config = AnalysisConfig::default();
    let metrics = ErrorMetricsEngine::new(&config.screen, &config.precision).analyze_trace(&trace);

    let logged = metrics.logged_x.expect("predictionErrorX column is summarized");
    assert!((logged.bias + 1.0).abs() < 1e-9, "bias {}", logged.bias);
    assert!((logged.mean_abs - 2.0).abs() < 1e-9, "mean |e| {}", logged.mean_abs);
    assert!((logged.max_abs - 3.0).abs() < 1e-9, "max |e| {}", logged.max_abs);
    assert!(logged.agreement_px < 1e-9, "column agrees with positions, off by {}", logged.agreement_px);
    assert!(metrics.logged.is_none(), "no errorMagnitude column");
    // Computed bias uses the opposite sign
    assert!((metrics.x.bias - 1.0).abs() < 1e-9);
}

#[test]
fn missing_required_column_is_fatal() {
    let file = write_temp(".csv", "GazeX,GazeY,pGazeX\n1,2,3\n");
    match load_trace(file.path(), 60.0) {
        Err(LoadError::MissingColumns { layout, missing }) => {
            assert_eq!(layout, InputLayout::Planar);
            assert_eq!(missing, vec!["pGazeY".to_string()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn spreadsheet_input_is_rejected() {
    let file = write_temp(".xlsx", "not really a workbook");
    assert!(
        matches!(load_trace(file.path(), 60.0), Err(LoadError::UnsupportedFormat(ref ext)) if ext == "xlsx"),
        "xlsx must be converted to CSV first"
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.csv");
    let err = load_trace(&path, 60.0).expect_err("file does not exist");
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"), "message: {err}");
}

#[test]
fn session_from_file_carries_source_and_counts() {
    let file = write_temp(".csv", &planar_csv(240, 0..3));
    let config = AnalysisConfig::default();
    let report = SessionAnalyzer::new(&config)
        .analyze_file(file.path())
        .expect("analyzable recording");

    assert_eq!(report.samples, 237);
    assert_eq!(report.dropped_rows, 3);
    assert!(report.source.ends_with(".csv"), "source: {}", report.source);

    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains("\"generated_at\""));
}
