//! Human-readable error descriptions and structured JSON error formatting.

use guide_core::error::{GuideError, KernelError};

fn kernel_hint(ke: &KernelError) -> String {
    match ke {
        KernelError::ParameterCount {
            what,
            expected,
            got,
        } => format!(
            "What happened: The kernel takes {expected} {what}, got {got}.\nLikely causes: kernel.hyperparameters does not match kernel.variant.\nHow to fix: Use 4 values for periodic_square_exponential and 6 for periodic_square_exponential2."
        ),
        KernelError::NonFinite { what, index } => format!(
            "What happened: Kernel {what}[{index}] is NaN or infinite.\nLikely causes: A typo or overflow in the config values.\nHow to fix: Use finite log-space values in the [kernel] table."
        ),
        KernelError::EvaluationMismatch { .. } => format!(
            "What happened: {ke}.\nLikely causes: Derivatives were requested from a different kernel variant than the one that evaluated.\nHow to fix: This is a bug; re-run with --log-level=debug and report it."
        ),
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ke) = err.downcast_ref::<KernelError>() {
        return kernel_hint(ke);
    }

    if let Some(ge) = err.downcast_ref::<GuideError>() {
        return match ge {
            GuideError::Kernel(ke) => kernel_hint(ke),
            GuideError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    // String-based heuristics for errors coming from config, profile or trace loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'measurement,exposure_ms'.".to_string();
    }

    if lower.contains("invalid csv row") {
        return format!(
            "What happened: The trace CSV contains an unreadable row ({msg}).\nLikely causes: A non-numeric measurement or a negative/fractional exposure_ms.\nHow to fix: Leave the measurement empty for dropped frames and use whole milliseconds."
        );
    }

    if lower.contains("parse config") || lower.contains("read config") {
        let cause = err.root_cause();
        return format!(
            "What happened: Could not load the configuration file.\nLikely causes: Wrong --config path or a TOML syntax error ({cause}).\nHow to fix: Check the path and the file contents."
        );
    }

    if lower.contains("settings profile") {
        return format!(
            "What happened: The persisted settings profile could not be used ({}).\nLikely causes: The profile file was edited by hand or the directory is read-only.\nHow to fix: Fix or delete the file named by profile.path; it is recreated on the next run.",
            err.root_cause()
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for kernel contract violations, 4 for invalid
/// configuration, 1 otherwise. Usage errors exit with 2 (clap).
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<KernelError>().is_some() {
        return 3;
    }
    match err.downcast_ref::<GuideError>() {
        Some(GuideError::Kernel(_)) => 3,
        Some(GuideError::Config(_)) => 4,
        _ => 1,
    }
}

/// Short stable name for the JSON `reason` field.
fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ke) = err.downcast_ref::<KernelError>() {
        return match ke {
            KernelError::ParameterCount { .. } => "ParameterCount",
            KernelError::NonFinite { .. } => "NonFinite",
            KernelError::EvaluationMismatch { .. } => "EvaluationMismatch",
        };
    }
    match err.downcast_ref::<GuideError>() {
        Some(GuideError::Config(_)) => "Config",
        Some(GuideError::Kernel(_)) => "Kernel",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_errors_are_typed() {
        let err: eyre::Report = KernelError::ParameterCount {
            what: "hyperparameters",
            expected: 4,
            got: 2,
        }
        .into();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("takes 4 hyperparameters, got 2"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).expect("json");
        assert_eq!(v["reason"], "ParameterCount");
        assert_eq!(v["exit_code"], 3);
    }

    #[test]
    fn config_errors_map_to_exit_code_4() {
        let err: eyre::Report = GuideError::Config("settings prefix must not be empty".into()).into();
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).contains("Invalid configuration"));
    }

    #[test]
    fn untyped_errors_fall_back_to_generic_reason() {
        let err = eyre::eyre!("disk full");
        assert_eq!(exit_code_for_error(&err), 1);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).expect("json");
        assert_eq!(v["reason"], "Error");
        assert!(v["message"].as_str().expect("message").contains("disk full"));
    }

    #[test]
    fn header_errors_are_recognized() {
        let err = eyre::eyre!("trace CSV must have headers 'measurement,exposure_ms', got: a,b");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).starts_with("Invalid headers in trace CSV"));
    }
}
