//! Human-readable error descriptions and structured JSON error formatting.

use rover_core::error::{BuildError, RoverError};

/// Map an `eyre::Report` to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingRange => {
                "What happened: No range sensor was provided to the controller.\nLikely causes: The ranging backend failed to initialize or was not wired into the builder.\nHow to fix: Make sure the backend creates the range sensor and passes it via with_range(...).".to_string()
            }
            BuildError::MissingEdges => {
                "What happened: No edge sensors were provided to the controller.\nLikely causes: The line sensor backend failed to initialize or was not wired into the builder.\nHow to fix: Make sure the backend creates both edge sensors and passes them via with_edges(...).".to_string()
            }
            BuildError::MissingMotors => {
                "What happened: No motor driver was provided to the controller.\nLikely causes: The H-bridge failed to initialize or was not wired into the builder.\nHow to fix: Make sure the motor driver is created and passed via with_motors(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/rover.toml for a sample."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RoverError>() {
        return match re {
            RoverError::Timeout => "What happened: The range sensor did not answer in time.\nLikely causes: TRIG/ECHO miswired, no 5V/GND, ECHO not level-shifted, or range.echo_timeout_ms too low.\nHow to fix: Check [pins] trig/echo and the sensor's power, and consider raising range.echo_timeout_ms.".to_string(),
            RoverError::HardwareFault(msg) | RoverError::Hardware(msg) => format!(
                "What happened: A peripheral reported an error ({msg}).\nLikely causes: Wiring, power, or GPIO permissions.\nHow to fix: Check the wiring for the sensor named above and re-run with --log-level=debug."
            ),
        };
    }

    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("gpio") {
        return format!(
            "What happened: Failed to access GPIO.\nLikely causes: Not running on a Raspberry Pi, wrong pin numbers, or insufficient permissions.\nHow to fix: Fix the [pins] values in the config and make sure the user can access /dev/gpiomem. Original: {msg}"
        );
    }

    if lower.contains("config") {
        return format!(
            "What happened: Configuration is invalid ({lower}).\nLikely causes: A typo or out-of-range value in the TOML file.\nHow to fix: Edit the config file and try again. See etc/rover.toml for a sample."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for setup errors, 3 for sensor timeouts, 4 for other
/// hardware faults, 1 otherwise. 130 is reserved for Ctrl-C.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<RoverError>() {
        Some(RoverError::Timeout) => 3,
        Some(_) => 4,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "InvalidConfig",
            _ => "MissingPeripheral",
        };
    }
    match err.downcast_ref::<RoverError>() {
        Some(RoverError::Timeout) => "Timeout",
        Some(_) => "HardwareFault",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
