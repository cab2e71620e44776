//! Human-readable error descriptions and structured JSON error formatting.

use tuner_core::{BuildError, TunerError};

/// Stable name for the `abort_reason` JSONL field.
pub fn abort_reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<TunerError>() {
        Some(TunerError::Interrupted) => "Interrupted",
        Some(TunerError::Timeout) => "Timeout",
        Some(TunerError::Source(_)) => "Source",
        Some(TunerError::Sink(_)) => "Sink",
        Some(TunerError::Config(_)) => "Config",
        None if err.downcast_ref::<BuildError>().is_some() => "Config",
        None => "Error",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDt => {
                "What happened: No sample period was given to the tuner.\nLikely causes: The builder was used without with_dt(...).\nHow to fix: Set tuner.dt_s in the config or call with_dt(...) before building.".to_string()
            }
            BuildError::MissingGains => {
                "What happened: No initial gains were given to the tuner.\nLikely causes: The builder was used without with_initial_gains(...).\nHow to fix: Provide [initial_gains] in the config or call with_initial_gains(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid tuner configuration ({msg}).\nLikely causes: Non-finite or out-of-range values.\nHow to fix: Edit the config file, then rerun `tuner check-config`."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TunerError>() {
        return match te {
            TunerError::Timeout => "What happened: The measurement source timed out.\nLikely causes: The plant stopped reporting or runner.sample_timeout_ms is too low.\nHow to fix: Check the measurement path and consider raising runner.sample_timeout_ms.".to_string(),
            TunerError::Interrupted => "What happened: The run was interrupted.\nLikely causes: Ctrl-C or a shutdown request.\nHow to fix: Start a new run; the gains printed so far were not applied further.".to_string(),
            TunerError::Source(msg) => format!(
                "What happened: Reading a measurement failed ({msg}).\nLikely causes: The measurement source faulted or ran out of data.\nHow to fix: Inspect the source; re-run with --log-level=debug for the failing tick."
            ),
            TunerError::Sink(msg) => format!(
                "What happened: Applying gains to the controller failed ({msg}).\nLikely causes: The controller rejected the update.\nHow to fix: Inspect the controller; re-run with --log-level=debug for the failing tick."
            ),
            TunerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `tuner check-config`."
            ),
        };
    }

    let msg = err.to_string();
    let lower = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
        .to_ascii_lowercase();

    if lower.contains("profile csv must have headers") {
        return "Invalid headers in profile CSV. Expected 'tick,setpoint'.".to_string();
    }

    if lower.contains("profile csv") {
        let root = err.root_cause();
        return format!(
            "What happened: The setpoint profile CSV could not be used ({root}).\nLikely causes: Unreadable file, bad rows, or ticks not strictly increasing.\nHow to fix: Fix the CSV so every row is `tick,setpoint` with increasing ticks."
        );
    }

    if lower.contains("parse config") || lower.contains("read config") {
        let cause = err.source().map(|s| format!(" Cause: {s}")).unwrap_or_default();
        return format!(
            "What happened: The config file could not be loaded.{cause}\nLikely causes: Wrong --config path or invalid TOML.\nHow to fix: Check the path and the TOML syntax (see etc/tuner_config.toml)."
        );
    }

    // Config::validate messages name the offending key, e.g. "limits.min_kp ..."
    if [
        "tuner.", "initial_gains.", "reference_model.", "limits.", "adaptation.",
        "thresholds.", "plant.", "profile.", "runner.", "logging.",
    ]
    .iter()
    .any(|p| lower.starts_with(p))
    {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `tuner check-config`."
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

/// Stable exit codes; clap usage errors exit with 2 before we get here.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<TunerError>() {
        Some(TunerError::Interrupted) => 3,
        Some(TunerError::Timeout) => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": abort_reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}
