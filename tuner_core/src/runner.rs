//! Periodic driver: reads measurements, feeds the tuner, pushes gains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use tuner_traits::clock::{Clock, MonotonicClock};
use tuner_traits::{GainSink, Measurement, MeasurementSource};

use crate::collab_error::{Side, map_collaborator_error};
use crate::error::{Report, Result, TunerError};
use crate::limiter::Gains;
use crate::mode::TuningMode;
use crate::tuner::Tuner;

/// How a run is driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    /// Ticks to execute.
    pub ticks: u64,
    /// Push gains to the sink after every N processed ticks (0 is treated as 1).
    pub apply_every: u64,
    /// Call `start_active_tuning` before this tick index; `None` never starts.
    pub start_tuning_after: Option<u64>,
    /// Sleep so ticks are spaced `dt` apart.
    pub pace: bool,
    /// Passed to `MeasurementSource::sample`.
    pub sample_timeout: Duration,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            ticks: 600,
            apply_every: 1,
            start_tuning_after: Some(0),
            pace: false,
            sample_timeout: Duration::from_millis(100),
        }
    }
}

/// Snapshot handed to the observer after each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    pub tick: u64,
    pub measurement: Measurement,
    pub model_output: f64,
    pub gains: Gains,
    pub mode: TuningMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub gains: Gains,
    pub model_output: f64,
    pub mode: TuningMode,
    pub rejected_samples: u64,
    pub gains_applied: u64,
}

impl RunSummary {
    fn capture(tuner: &Tuner, ticks: u64, gains_applied: u64) -> Self {
        Self {
            ticks,
            gains: tuner.adapted_gains(),
            model_output: tuner.reference_model_output(),
            mode: tuner.mode(),
            rejected_samples: tuner.rejected_samples(),
            gains_applied,
        }
    }
}

/// Run with the wall clock and no observer.
pub fn run<S, K>(
    source: &mut S,
    sink: &mut K,
    tuner: &mut Tuner,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> Result<RunSummary>
where
    S: MeasurementSource + ?Sized,
    K: GainSink + ?Sized,
{
    run_with(
        source,
        sink,
        tuner,
        params,
        shutdown,
        &MonotonicClock::new(),
        |_| {},
    )
}

/// Drive `tuner` for `params.ticks` ticks.
///
/// Stops early with `TunerError::Interrupted` once `shutdown` is set, and
/// with a mapped `TunerError` when a collaborator fails.
pub fn run_with<S, K, C, F>(
    source: &mut S,
    sink: &mut K,
    tuner: &mut Tuner,
    params: &RunParams,
    shutdown: &AtomicBool,
    clock: &C,
    mut observer: F,
) -> Result<RunSummary>
where
    S: MeasurementSource + ?Sized,
    K: GainSink + ?Sized,
    C: Clock + ?Sized,
    F: FnMut(&TickRecord),
{
    let apply_every = params.apply_every.max(1);
    let period = crate::util::period_from_dt(tuner.reference_model().dt());
    let epoch = clock.now();
    let mut gains_applied: u64 = 0;

    tracing::info!(
        ticks = params.ticks,
        apply_every,
        start_tuning_after = ?params.start_tuning_after,
        pace = params.pace,
        "run start"
    );

    for tick in 0..params.ticks {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!(tick, "run interrupted");
            return Err(Report::new(TunerError::Interrupted));
        }
        if params.start_tuning_after == Some(tick) {
            tuner.start_active_tuning();
        }

        let m = source
            .sample(params.sample_timeout)
            .map_err(|e| Report::new(map_collaborator_error(Side::Source, &*e)))
            .wrap_err_with(|| format!("reading measurement at tick {tick}"))?;

        tuner.process_measurement(m.setpoint, m.plant_output);

        if (tick + 1) % apply_every == 0 {
            let g = tuner.adapted_gains();
            sink.apply_gains(g.kp, g.ki, g.kd)
                .map_err(|e| Report::new(map_collaborator_error(Side::Sink, &*e)))
                .wrap_err_with(|| format!("applying gains at tick {tick}"))?;
            gains_applied += 1;
        }

        observer(&TickRecord {
            tick,
            measurement: m,
            model_output: tuner.reference_model_output(),
            gains: tuner.adapted_gains(),
            mode: tuner.mode(),
        });

        if params.pace {
            let deadline = period
                .checked_mul(u32::try_from(tick + 1).unwrap_or(u32::MAX))
                .map_or(epoch, |d| epoch + d);
            clock.sleep_until(deadline);
        }
    }

    let summary = RunSummary::capture(tuner, params.ticks, gains_applied);
    tracing::info!(
        ticks = summary.ticks,
        kp = summary.gains.kp,
        ki = summary.gains.ki,
        kd = summary.gains.kd,
        mode = %summary.mode,
        rejected = summary.rejected_samples,
        elapsed_ms = clock.elapsed_ms(epoch),
        "run complete"
    );
    Ok(summary)
}
