use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn binary_command() -> Command {
    let mut command = Command::new(assert_cmd::cargo::cargo_bin!("pkdconf"));
    command
        .env_remove("PKDCONF_PARAM_FILES")
        .env_remove("PKDCONF_FORMAT")
        .env_remove("PKDCONF_CHECK_TYPES")
        .env_remove("RUST_LOG");
    command
}

fn json_output(command: &mut Command) -> Value {
    let output = command.output().expect("run pkdconf");
    assert!(
        output.status.success(),
        "pkdconf failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn functional_help_flag_prints_grouped_listing_and_exits_zero() {
    binary_command()
        .args(["--", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("usage: pkdgrav3 [--help]"))
        .stdout(predicate::str::contains("Periodic Boundaries:"))
        .stdout(predicate::str::contains("-mpc DBOXSIZE"));
}

#[test]
fn functional_text_output_marks_command_line_values() {
    binary_command()
        .args(["--no-entry-point-script", "--", "-mpc", "50", "script.par"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dBoxSize = 50.0 *\n"))
        .stdout(predicate::str::contains("bPeriodic = False\n"))
        .stdout(predicate::str::contains("entry point: script.par"))
        .stdout(predicate::str::contains("engine argv: script.par"));
}

#[test]
fn integration_json_output_merges_param_files_under_command_line() {
    let temp = tempdir().expect("tempdir");
    let first = temp.path().join("first.toml");
    let second = temp.path().join("second.json");
    fs::write(&first, "dBoxSize = 999.0\nnSteps = 64\n").expect("write toml");
    fs::write(&second, r#"{"nSteps": 8, "bEwald": false, "pi": 3.14}"#).expect("write json");

    let payload = json_output(binary_command().args([
        "--format",
        "json",
        "--param-file",
        first.to_str().expect("utf8 path"),
        "--param-file",
        second.to_str().expect("utf8 path"),
        "--",
        "-mpc",
        "50",
    ]));

    let values = &payload["parameters"]["values"];
    let specified = &payload["parameters"]["specified"];
    assert_eq!(values["dBoxSize"], 50.0);
    assert_eq!(values["nSteps"], 64);
    assert_eq!(values["bEwald"], false);
    assert_eq!(specified["dBoxSize"], true);
    assert_eq!(specified["bEwald"], true);
    assert_eq!(specified["bPeriodic"], false);
    assert_eq!(payload["entry_point"], Value::Null);
    assert_eq!(payload["engine_argv"], serde_json::json!(["pkdgrav3"]));

    let scripts = payload["scripts"].as_array().expect("scripts array");
    assert_eq!(scripts.len(), 2);
    assert_eq!(scripts[0]["shadowed"], serde_json::json!(["dBoxSize"]));
    assert_eq!(scripts[1]["shadowed"], serde_json::json!(["nSteps"]));
    assert_eq!(scripts[1]["ignored"], serde_json::json!(["pi"]));
}

#[test]
fn integration_entry_point_parameter_script_is_merged_first() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("cosmo.par"),
        "from math import pi\nnSteps = 32\nbPeriodic = True\n",
    )
    .expect("write par");
    fs::write(temp.path().join("extra.toml"), "nSteps = 4\ndTheta = 0.5\n").expect("write toml");

    let payload = json_output(binary_command().current_dir(temp.path()).args([
        "--format",
        "json",
        "--param-file",
        "extra.toml",
        "--",
        "cosmo.par",
    ]));

    let values = &payload["parameters"]["values"];
    assert_eq!(values["nSteps"], 32);
    assert_eq!(values["bPeriodic"], true);
    assert_eq!(values["dTheta"], 0.5);
    assert_eq!(payload["entry_point"], "cosmo.par");
    assert_eq!(payload["engine_argv"], serde_json::json!(["cosmo.par"]));
}

#[test]
fn regression_coercion_failure_names_parameter_and_token() {
    binary_command()
        .args(["--", "-mpc", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dBoxSize"))
        .stderr(predicate::str::contains("abc"));
}

#[test]
fn regression_normalization_options_are_mutually_exclusive() {
    binary_command()
        .args(["--", "-S8", "0.8", "-As", "2.1e-9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed with argument -S8"));
}

#[test]
fn regression_missing_param_file_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let missing = temp.path().join("absent.par");
    binary_command()
        .args(["--param-file", missing.to_str().expect("utf8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read parameter script"));
}

#[test]
fn regression_check_types_rejects_wrongly_typed_script_values() {
    let temp = tempdir().expect("tempdir");
    let script = temp.path().join("bad.json");
    fs::write(&script, r#"{"dBoxSize": "big"}"#).expect("write json");
    let script = script.to_str().expect("utf8 path");

    binary_command()
        .args(["--param-file", script])
        .assert()
        .success()
        .stdout(predicate::str::contains("dBoxSize = big *"));

    binary_command()
        .args(["--check-types", "--param-file", script])
        .assert()
        .failure()
        .stderr(predicate::str::contains("type check failed"))
        .stderr(predicate::str::contains("dBoxSize (expected float, found text)"));
}

#[test]
fn regression_missing_entry_point_parameter_script_is_an_error() {
    let temp = tempdir().expect("tempdir");
    binary_command()
        .current_dir(temp.path())
        .args(["--", "cosm.par"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "entry point parameter script cosm.par does not exist",
        ));

    binary_command()
        .current_dir(temp.path())
        .args(["--no-entry-point-script", "--", "cosm.par"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry point: cosm.par"));

    binary_command()
        .current_dir(temp.path())
        .args(["--", "analysis.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry point: analysis.py"));
}

#[test]
fn regression_help_wins_over_later_invalid_tokens() {
    binary_command()
        .args(["--", "--help", "-mpc", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("usage: pkdgrav3 [--help]"));
}
