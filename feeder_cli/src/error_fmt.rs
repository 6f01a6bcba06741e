//! Human-readable error descriptions and structured JSON error formatting.

use feeder_core::error::{BuildError, FeederError};

/// Map an eyre::Report to an explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDeviceId => {
                "What happened: No device id was configured.\nHow to fix: Set device.id in the config TOML.".to_string()
            }
            BuildError::MissingStore => {
                "What happened: No schedule store was wired into the controller.\nHow to fix: Check schedule.path in the config TOML.".to_string()
            }
            BuildError::MissingCalendar => {
                "What happened: No wall-clock source was wired into the controller.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(fe) = err.downcast_ref::<FeederError>() {
        if matches!(fe, FeederError::Busy) {
            return "What happened: A feed cycle is already running.\nHow to fix: Wait for the completion report, then retry.".to_string();
        }
        if let FeederError::HardwareFault(_) = fe {
            return format!(
                "What happened: {fe}.\nLikely causes: Wiring, power, or GPIO permissions.\nHow to fix: Check the [pins] values in the config and the device wiring."
            );
        }
        return format!(
            "What happened: {fe}.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: busy rejections return 3, everything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if matches!(err.downcast_ref::<FeederError>(), Some(FeederError::Busy)) {
        return 3;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<FeederError>() {
        Some(FeederError::Busy) => "Busy",
        Some(FeederError::HardwareFault(_)) | Some(FeederError::Hardware(_)) => "Hardware",
        Some(FeederError::Command(_)) => "Command",
        Some(FeederError::Gateway(_)) => "Gateway",
        Some(FeederError::Storage(_)) => "Storage",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
