use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML config for sim mode. The motor is geared down to a
// 100-step revolution and the verification window to 100 ms so a feed run
// finishes in about a second.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let plan_path = dir.path().join("conf.json");
    let toml = format!(
        r#"
[device]
id = "01A03"

[motor]
steps_per_rev = 100
rpm = 60

[inspection]
interval_ms = 10
iterations = 10

[schedule]
path = "{}"
poll_interval_ms = 1000
"#,
        plan_path.display()
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], "Usage:", "stdout")]
#[case(&["check-config"], "configuration OK", "stdout")]
#[case(&["feed", "--amount", "1"], "feeding-res", "stdout")]
fn cli_success_cases(#[case] args: &[&str], #[case] needle: &str, #[case] stream: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("feeder_cli").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().success();
    match stream {
        "stdout" => assert.stdout(predicate::str::contains(needle)),
        _ => assert.stderr(predicate::str::contains(needle)),
    };
}

#[test]
fn feed_reports_the_detected_amount() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    // Ambient light never dips below the threshold in sim, so zero drops.
    Command::cargo_bin("feeder_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["feed", "--amount", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"manual""#))
        .stdout(predicate::str::contains(r#""amount":0"#));
}

#[test]
fn zero_amount_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    Command::cargo_bin("feeder_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["feed", "--amount", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("amount must be >= 1"));
}

#[test]
fn invalid_config_is_rejected_with_the_failing_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(
        &path,
        r#"
[device]
id = "01A03"

[motor]
steps_per_rev = 2048
rpm = 0
"#,
    )
    .unwrap();

    Command::cargo_bin("feeder_cli")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"))
        .stderr(predicate::str::contains("motor.rpm"));
}

#[test]
fn missing_config_file_is_an_error() {
    Command::cargo_bin("feeder_cli")
        .unwrap()
        .args(["--config", "/nonexistent/feeder.toml", "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading config"));
}

#[test]
fn json_mode_emits_structured_errors() {
    Command::cargo_bin("feeder_cli")
        .unwrap()
        .args(["--config", "/nonexistent/feeder.toml", "--json", "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""reason":"Error""#));
}
