//! Output format validation tests.
//!
//! Tests JSON/JSONL output format correctness and required field presence.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::PathBuf;

use assert_cmd::Command;
use doc_qa_test_support::SyntheticRasterBuilder;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// A temp dir with `small.png` (rejected on resolution) and `notes.txt`.
fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let raster = SyntheticRasterBuilder::checkerboard(64, 64);
    std::fs::write(
        dir.path().join("small.png"),
        SyntheticRasterBuilder::png_bytes(&raster),
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a scan").unwrap();
    dir
}

fn small_png(dir: &TempDir) -> PathBuf {
    dir.path().join("small.png")
}

fn run(args: &[&str], paths: &[PathBuf]) -> (Option<i32>, String) {
    let output = Command::cargo_bin("doc-qa")
        .unwrap()
        .args(args)
        .args(paths)
        .output()
        .unwrap();
    (
        output.status.code(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

fn first_record(stdout: &str) -> Value {
    serde_json::from_str(stdout.lines().next().unwrap()).unwrap()
}

// === JSONL Format Tests ===

#[test]
fn test_jsonl_format_single_object_per_line() {
    let dir = fixtures();
    let (_, stdout) = run(&["--format", "jsonl"], &[small_png(&dir)]);

    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let value: Value = serde_json::from_str(line).unwrap();
        assert!(value.is_object(), "JSONL line should be an object");
    }
}

#[test]
fn test_jsonl_format_multiple_files() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[small_png(&dir), small_png(&dir)]);

    let lines: Vec<_> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 2, "Should have one line per file");
}

// === JSON Array Format Tests ===

#[test]
fn test_json_format_is_array() {
    let dir = fixtures();
    let (_, stdout) = run(&["--format", "json"], &[small_png(&dir)]);

    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[test]
fn test_json_format_empty_array_for_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout) = run(&["--format", "json"], &[dir.path().to_path_buf()]);

    assert_eq!(code, Some(0));
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_pretty_format_is_indented() {
    let dir = fixtures();
    let (_, stdout) = run(&["--format", "json", "--pretty"], &[small_png(&dir)]);

    assert!(stdout.contains("\n  "), "Pretty output should be indented");
    assert!(serde_json::from_str::<Value>(&stdout).is_ok());
}

#[test]
fn test_non_pretty_format_is_compact() {
    let dir = fixtures();
    let (_, stdout) = run(&["--format", "json"], &[small_png(&dir)]);

    assert_eq!(stdout.trim_end().lines().count(), 1);
}

// === Record Fields ===

#[test]
fn test_record_has_path_and_timestamp() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[small_png(&dir)]);
    let record = first_record(&stdout);

    assert!(record["path"].as_str().unwrap().ends_with("small.png"));
    let ts = record["timestamp"].as_str().unwrap();
    assert!(ts.contains('T') && ts.ends_with('Z'), "RFC 3339 UTC: {ts}");
    assert_eq!(record["kind"], "raster_image");
}

#[test]
fn test_record_has_verdict_fields() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[small_png(&dir)]);
    let record = first_record(&stdout);

    assert_eq!(record["isAcceptable"], false);
    assert_eq!(record["level"], "rejected");
    assert!(record["problems"].is_array());
}

#[test]
fn test_image_metrics_shape() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[small_png(&dir)]);
    let metrics = &first_record(&stdout)["metrics"];

    assert_eq!(metrics["resolution"], 64);
    assert!(metrics["sharpness"].is_u64());
    assert_eq!(metrics["contrast"], 1.0);
    assert_eq!(metrics["noise"], 0.5);
    assert!(metrics["fileSizeKB"].is_u64());
}

#[test]
fn test_problems_in_check_order() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[small_png(&dir)]);
    let record = first_record(&stdout);
    let problems: Vec<&str> = record["problems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();

    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0], "Resolution too low (64px). Minimum: 1000px");
    assert!(problems[1].starts_with("File is over-compressed ("));
}

#[test]
fn test_unsupported_file_has_null_metrics() {
    let dir = fixtures();
    let (code, stdout) = run(&[], &[dir.path().join("notes.txt")]);
    let record = first_record(&stdout);

    assert_eq!(code, Some(1));
    assert_eq!(record["kind"], "unsupported");
    assert!(record["metrics"].is_null());
    assert_eq!(record["problems"], serde_json::json!(["Unsupported file type"]));
}

#[test]
fn test_directory_scan_skips_unsupported_extensions() {
    let dir = fixtures();
    let (_, stdout) = run(&[], &[dir.path().to_path_buf()]);

    assert_eq!(stdout.lines().count(), 1);
    assert!(first_record(&stdout)["path"]
        .as_str()
        .unwrap()
        .ends_with("small.png"));
}

#[test]
fn test_corrupt_image_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"\xFF\xD8 definitely not a jpeg").unwrap();

    Command::cargo_bin("doc-qa")
        .unwrap()
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""problems":["Failed to load image"]"#))
        .stdout(predicate::str::contains(r#""metrics":null"#));
}
