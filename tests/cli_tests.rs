// tests/cli_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Binary smoke tests

fn write_program(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(source.as_bytes()).expect("failed to write program");
    file
}

#[test]
fn test_cli_runs_program_and_prints_stage_table() {
    let file = write_program(
        "ADDI R1, R0, 5\n\
         ADDI R2, R0, 7\n\
         ADD R3, R1, R2\n",
    );

    Command::cargo_bin("tomasulo_rust")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD R3, R1, R2"))
        .stdout(predicate::str::contains("R3  = 12"))
        .stdout(predicate::str::contains("Simulation Statistics"));
}

#[test]
fn test_cli_json_report() {
    let file = write_program("ADDI R1, R0, 3\n");

    let output = Command::cargo_bin("tomasulo_rust")
        .unwrap()
        .arg(file.path())
        .arg("--json")
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON report");
    assert_eq!(report["finished"], serde_json::Value::Bool(true));
    assert_eq!(report["registers"][0][0], 1);
    assert_eq!(report["registers"][0][1], 3);
    assert!(report["instructions"].as_array().unwrap().len() == 1);
}

#[test]
fn test_cli_reports_parse_errors_and_continues() {
    let file = write_program(
        "ADDI R1, R0, 1\n\
         GARBAGE LINE\n\
         ADDI R2, R0, 2\n",
    );

    Command::cargo_bin("tomasulo_rust")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("line 2"))
        .stdout(predicate::str::contains("R2  = 2"));
}

#[test]
fn test_cli_missing_file_fails() {
    Command::cargo_bin("tomasulo_rust")
        .unwrap()
        .arg("no_such_file.asm")
        .assert()
        .failure();
}

#[test]
fn test_cli_reports_trap() {
    let file = write_program(
        "ADDI R1, R0, 8\n\
         DIV R2, R1, R0\n",
    );

    Command::cargo_bin("tomasulo_rust")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("division by zero"));
}
