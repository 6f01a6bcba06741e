use feeder_config::load_toml;
use rstest::rstest;

const MINIMAL: &str = r#"
[device]
id = "01A03"
"#;

#[test]
fn minimal_config_uses_device_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("defaults validate");

    assert_eq!(cfg.button.press_min_ms, 100);
    assert_eq!(cfg.button.long_press_min_ms, 3000);
    assert_eq!(cfg.light.blocked_threshold, 1034);
    assert_eq!(cfg.motor.steps_per_rev, 2048);
    assert_eq!(cfg.motor.rpm, 12);
    assert_eq!(cfg.inspection.interval_ms, 10);
    assert_eq!(cfg.inspection.iterations, 200);
    assert_eq!(cfg.gateway.results_topic, "feeding-res");
}

#[test]
fn rejects_empty_device_id() {
    let cfg = load_toml("[device]\nid = \"  \"\n").expect("parse TOML");
    let err = cfg.validate().expect_err("blank id must be rejected");
    assert!(format!("{err}").contains("device.id"));
}

#[test]
fn rejects_long_press_not_above_press_min() {
    let toml = r#"
[device]
id = "01A03"

[button]
press_min_ms = 100
long_press_min_ms = 100
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("equal thresholds must be rejected");
    assert!(format!("{err}").contains("long_press_min_ms"));
}

#[rstest]
#[case("[motor]\nsteps_per_rev = 0", "steps_per_rev")]
#[case("[motor]\nrpm = 0", "rpm")]
#[case("[inspection]\ninterval_ms = 0", "interval_ms")]
#[case("[inspection]\niterations = 0", "iterations")]
#[case("[schedule]\npoll_interval_ms = 0", "poll_interval_ms")]
fn rejects_zeroed_timing_fields(#[case] section: &str, #[case] field: &str) {
    let toml = format!("[device]\nid = \"01A03\"\n\n{section}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("zero must be rejected");
    assert!(
        format!("{err}").contains(field),
        "expected error naming {field}, got: {err}"
    );
}

#[test]
fn rejects_empty_topic() {
    let toml = r#"
[device]
id = "01A03"

[gateway]
errors_topic = ""
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("empty topic must be rejected");
    assert!(format!("{err}").contains("errors_topic"));
}

#[test]
fn missing_device_section_is_a_parse_error() {
    assert!(load_toml("[button]\npress_min_ms = 100\n").is_err());
}
