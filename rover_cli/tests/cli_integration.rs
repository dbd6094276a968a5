use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Simulated time only, so a run finishes as fast as the host allows.
fn write_sim_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[sim]
realtime = false
arena_cm = [200.0, 150.0]
hole = [120.0, 40.0, 40.0, 30.0]

[logging]
level = "warn"
{extra}
"#
    );
    let path = dir.path().join("rover.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--cycles", "2"], 0, "run complete: 2 cycles", "stdout")]
#[case(&["self-check"], 0, "self-check ok (sim)", "stdout")]
#[case(&["fly"], 2, "unrecognized subcommand", "stderr")]
#[case(&["run", "--rt-prio", "5"], 2, "--rt", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_sim_config(&dir, "");

    let mut cmd = Command::cargo_bin("rover").unwrap();
    cmd.arg("--config").arg(&cfg).args(args);

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn json_run_reports_stats() {
    let dir = tempdir().unwrap();
    let cfg = write_sim_config(&dir, "");

    let out = Command::cargo_bin("rover")
        .unwrap()
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["run", "--cycles", "3"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(v["status"], "complete");
    assert_eq!(v["backend"], "sim");
    assert_eq!(v["stats"]["cycles"], 3);
    let scans = v["stats"]["scans"].as_u64().unwrap();
    let retreats = v["stats"]["retreats"].as_u64().unwrap();
    assert_eq!(scans + retreats, 3);
    assert!(v["stats"]["samples"].as_u64().unwrap() > 0);
    assert_eq!(v["trim"]["left"], 0);
}

#[rstest]
fn invalid_config_is_humanized() {
    let dir = tempdir().unwrap();
    let cfg = write_sim_config(&dir, "[sound]\ntempo_bpm = 0\n");

    Command::cargo_bin("rover")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tempo_bpm"))
        .stderr(predicate::str::contains("How to fix"));
}

#[rstest]
fn invalid_config_as_json() {
    let dir = tempdir().unwrap();
    let cfg = write_sim_config(&dir, "[drive]\nmax_speed = 0\n");

    let out = Command::cargo_bin("rover")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Error");
    assert!(v["message"].as_str().unwrap().contains("max_speed"));
}

#[rstest]
fn missing_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    Command::cargo_bin("rover")
        .unwrap()
        .args(["--log-level", "info", "--config"])
        .arg(&missing)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("self-check ok"))
        .stderr(predicate::str::contains("using defaults"));
}
