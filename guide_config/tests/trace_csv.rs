use guide_config::{TraceRow, load_trace_csv};
use std::fs;
use tempfile::tempdir;

fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn loads_rows_in_order() {
    let (_dir, path) = write("measurement,exposure_ms\n0.5,2000\n,2000\n-0.25, 1500\n");
    let rows = load_trace_csv(&path).expect("load");
    assert_eq!(
        rows,
        vec![
            TraceRow {
                measurement: Some(0.5),
                exposure_ms: 2000
            },
            TraceRow {
                measurement: None,
                exposure_ms: 2000
            },
            TraceRow {
                measurement: Some(-0.25),
                exposure_ms: 1500
            },
        ]
    );
}

#[test]
fn rejects_wrong_headers() {
    let (_dir, path) = write("error,exposure\n0.5,2000\n");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("headers 'measurement,exposure_ms'"));
}

#[test]
fn reports_line_of_bad_row() {
    let (_dir, path) = write("measurement,exposure_ms\n0.5,2000\nabc,2000\n");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[test]
fn rejects_negative_exposure_and_nan() {
    let (_dir, path) = write("measurement,exposure_ms\n0.5,-10\n");
    assert!(load_trace_csv(&path).is_err());
    let (_dir, path) = write("measurement,exposure_ms\nNaN,1000\n");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("must be finite"));
}

#[test]
fn rejects_empty_trace() {
    let (_dir, path) = write("measurement,exposure_ms\n");
    let err = load_trace_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("no rows"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_trace_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err}").contains("open trace CSV"));
}
