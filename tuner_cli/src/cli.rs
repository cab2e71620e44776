//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "tuner", version, about = "Adaptive PID gain tuner")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/tuner_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tuner against the simulated plant
    Simulate {
        /// Override runner.ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Never request tuning; the gains stay at their initial values
        #[arg(long = "no-tune", action = ArgAction::SetTrue)]
        no_tune: bool,
        /// Setpoint profile CSV (strict header `tick,setpoint`), replaces [profile]
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
        /// Write a per-tick trace CSV
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Pace ticks in real time at tuner.dt_s
        #[arg(long, action = ArgAction::SetTrue)]
        pace: bool,
    },
    /// Load and validate the config, then exit
    CheckConfig,
}
