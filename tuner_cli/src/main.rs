//! `tuner` binary: simulate adaptive PID tuning against a configured plant.

mod cli;
mod error_fmt;
mod logging;
mod simulate;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tuner_core::TunerError;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::simulate::{SimulateOpts, run_simulate};

fn main() {
    // clap prints usage and exits with 2 on bad arguments
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(&cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "command failed");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: &Path) -> eyre::Result<tuner_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = tuner_config::load_toml(&text)
        .map_err(eyre::Report::new)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(TunerError::Config(e.to_string())))?;
    Ok(cfg)
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    logging::init_logging(cli.json, &cli.log_level, &cfg.logging)?;

    match &cli.cmd {
        Commands::CheckConfig => {
            tracing::info!(config = %cli.config.display(), "config validated");
            println!("config ok");
            Ok(())
        }
        Commands::Simulate {
            ticks,
            no_tune,
            profile,
            trace,
            pace,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let opts = SimulateOpts {
                ticks: *ticks,
                no_tune: *no_tune,
                profile: profile.as_deref(),
                trace: trace.as_deref(),
                pace: *pace,
            };
            run_simulate(&cfg, &opts, cli.json, &shutdown)
        }
    }
}
