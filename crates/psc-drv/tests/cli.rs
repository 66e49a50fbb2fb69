//! CLI-level end-to-end tests, exercising the `psc` binary the way a
//! user invokes it rather than calling the library directly.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn psc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_psc"))
}

#[test]
fn help_flag_exits_successfully() {
    let mut cmd = Command::new(psc_bin());
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("psc")));
}

#[test]
fn compiling_a_valid_program_writes_all_five_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let input_path = fixtures_dir().join("hello.psc");

    let mut cmd = Command::new(psc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_dir);
    cmd.assert().success();

    for suffix in ["_tokens.txt", "_ast.txt", "_symbols.txt", "_code.txt", "_x86.asm"] {
        let path = output_dir.join(format!("hello{suffix}"));
        assert!(path.exists(), "expected {} to exist", path.display());
    }

    let tokens = std::fs::read_to_string(output_dir.join("hello_tokens.txt")).unwrap();
    assert!(tokens.contains("Total tokens:"));

    let code = std::fs::read_to_string(output_dir.join("hello_code.txt")).unwrap();
    assert!(code.contains("PRINT x"));
}

#[test]
fn a_program_with_a_semantic_error_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let input_path = fixtures_dir().join("undefined_var.psc");

    let mut cmd = Command::new(psc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_dir);
    cmd.assert().failure();
}

#[test]
fn missing_source_file_is_a_failure_not_a_panic() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::new(psc_bin());
    cmd.arg(temp_dir.path().join("does_not_exist.psc"));
    cmd.assert().failure();
}

#[test]
fn debug_mode_still_produces_code_after_a_semantic_error() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out");
    let input_path = fixtures_dir().join("undefined_var.psc");

    let mut cmd = Command::new(psc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_dir).arg("-d");
    cmd.assert().failure();

    assert!(output_dir.join("undefined_var_code.txt").exists());
}
