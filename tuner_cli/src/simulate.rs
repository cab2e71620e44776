//! `simulate` subcommand: tuner against a simulated PID-controlled plant.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use eyre::WrapErr;
use tuner_core::runner::{self, RunParams, RunSummary, TickRecord};
use tuner_core::Tuner;
use tuner_sim::{PidController, Plant, SetpointProfile, SimFault, SimulatedAxis};
use tuner_traits::clock::MonotonicClock;

use crate::error_fmt::abort_reason_name;

/// CLI overrides on top of `[runner]`.
#[derive(Debug, Default)]
pub struct SimulateOpts<'a> {
    pub ticks: Option<u64>,
    pub no_tune: bool,
    pub profile: Option<&'a Path>,
    pub trace: Option<&'a Path>,
    pub pace: bool,
}

fn build_profile(cfg: &tuner_config::Config, csv: Option<&Path>) -> eyre::Result<SetpointProfile> {
    if let Some(path) = csv {
        let points = tuner_config::load_profile_csv(path)
            .wrap_err_with(|| format!("load profile CSV {}", path.display()))?;
        return Ok(SetpointProfile::Points(
            points.into_iter().map(|p| (p.tick, p.setpoint)).collect(),
        ));
    }
    let p = &cfg.profile;
    let dt_s = cfg.tuner.dt_s;
    Ok(match p.kind {
        tuner_config::ProfileKind::Step => SetpointProfile::Step {
            amplitude: p.amplitude,
            offset: p.offset,
        },
        tuner_config::ProfileKind::Square => SetpointProfile::Square {
            amplitude: p.amplitude,
            offset: p.offset,
            period_s: p.period_s,
            dt_s,
        },
        tuner_config::ProfileKind::Sine => SetpointProfile::Sine {
            amplitude: p.amplitude,
            offset: p.offset,
            period_s: p.period_s,
            dt_s,
        },
    })
}

fn build_axis(cfg: &tuner_config::Config, profile: SetpointProfile) -> SimulatedAxis {
    let plant = Plant::new(cfg.plant.gain, cfg.plant.time_constant_s, cfg.plant.inertia_s);
    let g = &cfg.initial_gains;
    let pid = PidController::new(g.kp, g.ki, g.kd).with_output_limit(cfg.plant.output_limit);
    let mut axis = SimulatedAxis::new(plant, pid, profile, cfg.tuner.dt_s);

    // Test hook: make the source time out at a given tick.
    if let Some(tick) = std::env::var("TUNER_TEST_SIM_TIMEOUT")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
    {
        axis = axis.with_fault(SimFault::TimeoutAt(tick));
    }
    axis
}

fn run_params(cfg: &tuner_config::Config, opts: &SimulateOpts<'_>) -> RunParams {
    let mut params = RunParams::from(&cfg.runner);
    if let Some(t) = opts.ticks {
        params.ticks = t;
    }
    if opts.no_tune {
        params.start_tuning_after = None;
    }
    params.pace |= opts.pace;
    params
}

struct TraceWriter {
    writer: csv::Writer<File>,
    error: Option<csv::Error>,
}

impl TraceWriter {
    fn create(path: &Path) -> eyre::Result<Self> {
        let mut writer = csv::Writer::from_path(path)
            .wrap_err_with(|| format!("create trace CSV {}", path.display()))?;
        writer.write_record([
            "tick",
            "setpoint",
            "plant_output",
            "model_output",
            "kp",
            "ki",
            "kd",
            "mode",
        ])?;
        Ok(Self {
            writer,
            error: None,
        })
    }

    fn record(&mut self, r: &TickRecord) {
        if self.error.is_some() {
            return;
        }
        let row = [
            r.tick.to_string(),
            r.measurement.setpoint.to_string(),
            r.measurement.plant_output.to_string(),
            r.model_output.to_string(),
            r.gains.kp.to_string(),
            r.gains.ki.to_string(),
            r.gains.kd.to_string(),
            r.mode.as_str().to_string(),
        ];
        if let Err(e) = self.writer.write_record(&row) {
            self.error = Some(e);
        }
    }

    fn finish(mut self) -> eyre::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e).wrap_err("write trace CSV");
        }
        self.writer.flush().wrap_err("flush trace CSV")?;
        Ok(())
    }
}

fn unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

pub fn run_simulate(
    cfg: &tuner_config::Config,
    opts: &SimulateOpts<'_>,
    json: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    let mut tuner = Tuner::from_config(cfg)?;
    let profile = build_profile(cfg, opts.profile)?;
    let axis = build_axis(cfg, profile);
    let (mut source, mut sink) = axis.split();
    let params = run_params(cfg, opts);
    let mut trace = opts.trace.map(TraceWriter::create).transpose()?;

    tracing::info!(
        ticks = params.ticks,
        tuning = params.start_tuning_after.is_some(),
        trace = opts.trace.is_some(),
        "simulate start"
    );

    let started = Instant::now();
    let result = runner::run_with(
        &mut source,
        &mut sink,
        &mut tuner,
        &params,
        shutdown,
        &MonotonicClock::new(),
        |rec| {
            if let Some(t) = trace.as_mut() {
                t.record(rec);
            }
        },
    );
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Some(t) = trace {
        t.finish()?;
    }

    match result {
        Ok(summary) => {
            report_success(&summary, axis.plant_output(), duration_ms, json);
            Ok(())
        }
        Err(e) => {
            if json {
                report_abort(&e, axis.ticks(), duration_ms);
            }
            Err(e)
        }
    }
}

fn report_success(summary: &RunSummary, plant_output: f64, duration_ms: u64, json: bool) {
    if json {
        let line = serde_json::json!({
            "timestamp": unix_ms(),
            "ticks": summary.ticks,
            "kp": summary.gains.kp,
            "ki": summary.gains.ki,
            "kd": summary.gains.kd,
            "model_output": summary.model_output,
            "plant_output": plant_output,
            "mode": summary.mode.as_str(),
            "rejected_samples": summary.rejected_samples,
            "gains_applied": summary.gains_applied,
            "duration_ms": duration_ms,
            "abort_reason": serde_json::Value::Null,
        });
        println!("{line}");
    } else {
        println!(
            "Simulation complete: {} ticks, mode {}, gains kp={:.4} ki={:.4} kd={:.4}, model {:.4}, plant {:.4}",
            summary.ticks,
            summary.mode,
            summary.gains.kp,
            summary.gains.ki,
            summary.gains.kd,
            summary.model_output,
            plant_output,
        );
    }
}

fn report_abort(err: &eyre::Report, ticks_done: u64, duration_ms: u64) {
    let line = serde_json::json!({
        "timestamp": unix_ms(),
        "ticks": ticks_done,
        "kp": serde_json::Value::Null,
        "ki": serde_json::Value::Null,
        "kd": serde_json::Value::Null,
        "model_output": serde_json::Value::Null,
        "plant_output": serde_json::Value::Null,
        "mode": serde_json::Value::Null,
        "rejected_samples": serde_json::Value::Null,
        "gains_applied": serde_json::Value::Null,
        "duration_ms": duration_ms,
        "abort_reason": abort_reason_name(err),
    });
    println!("{line}");
}
