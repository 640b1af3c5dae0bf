//! CLI integration tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_qtm(args: &[&str], output_dir: &Path) -> Output {
    Command::new("cargo")
        .args(["run", "-p", "qtm-cli", "--quiet", "--"])
        .args(args)
        .env("QTM_OUTPUT_DIR", output_dir)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "qtm-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("collect"), "Should show collect command");
    assert!(stdout.contains("report"), "Should show report command");
    assert!(stdout.contains("--output-dir"), "Should show output-dir option");
    assert!(stdout.contains("QTM_OUTPUT_DIR"), "Should show env var");
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig option");
    assert!(
        stdout.contains("--exclude-namespace"),
        "Should show exclusion option"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "qtm-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("qtm"), "Should show binary name");
}

/// Test report subcommand help
#[test]
fn test_report_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "qtm-cli", "--", "report", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Report help should succeed");
    assert!(stdout.contains("--top"), "Should show top option");
    assert!(stdout.contains("--percentile"), "Should show percentile option");
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = Command::new("cargo")
        .args(["run", "-p", "qtm-cli", "--", "invalid-command"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// An explicit input path that does not exist is an immediate failure.
#[test]
fn test_report_missing_explicit_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_qtm(&["report", "/nonexistent/history.csv"], dir.path());

    assert!(!output.status.success(), "Missing explicit input should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "Should name the condition");
}

/// A missing dataset at the default location is the empty-dataset
/// condition, not a failure.
#[test]
fn test_report_missing_default_dataset_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_qtm(&["report"], dir.path());

    assert!(output.status.success(), "Empty-dataset condition should exit zero");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nothing to aggregate"));
}

const DATASET_HEADER: &str =
    "collected_at,namespace,pod,pod_uid,queue_seconds,created_at,started_at\n";

fn dataset_row(namespace: &str, pod: &str, queue_seconds: f64) -> String {
    format!(
        "2026-08-05T10:00:00Z,{namespace},{pod},uid-{pod},{queue_seconds},2026-08-05T09:00:00Z,2026-08-05T09:10:00Z\n"
    )
}

fn write_dataset(dir: &Path, rows: &[String]) {
    let mut content = String::from(DATASET_HEADER);
    for row in rows {
        content.push_str(row);
    }
    fs::write(dir.join("queue_time_history.csv"), content).unwrap();
}

/// End to end: a populated dataset yields a summary and four report
/// files.
#[test]
fn test_report_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(
        dir.path(),
        &[
            dataset_row("team-a", "web-1", 10.0),
            dataset_row("team-a", "web-2", 20.0),
            dataset_row("team-b", "api-1", 100.0),
        ],
    );

    let output = run_qtm(&["report"], dir.path());
    assert!(
        output.status.success(),
        "report failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Samples analyzed:  3"));
    assert!(stdout.contains("team-b"), "Should list namespaces");
    assert!(stdout.contains("Reports written"));

    let reports: Vec<_> = fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().any(|n| n.starts_with("namespace_stats_")));
    assert!(reports.iter().any(|n| n.starts_with("daily_stats_")));
    assert!(reports.iter().any(|n| n.starts_with("top_queue_times_")));
    assert!(reports.iter().any(|n| n.starts_with("summary_")));
}

/// A dataset holding only excluded-namespace rows reports zero samples
/// and writes nothing.
#[test]
fn test_report_all_rows_excluded() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &[dataset_row("kube-system", "coredns", 5.0)]);

    let output = run_qtm(&["report"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 valid samples"));
    assert!(!dir.path().join("reports").exists(), "No report files expected");
}

/// JSON format emits the full report as a single document.
#[test]
fn test_report_json_format() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &[dataset_row("team-a", "web-1", 42.0)]);

    let output = run_qtm(&["report", "--format", "json"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.find('{').expect("JSON document in output");
    let end = stdout.rfind('}').unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout[start..=end]).unwrap();
    assert_eq!(report["summary"]["analyzed"], 1);
    assert_eq!(report["namespaces"][0]["namespace"], "team-a");
}
