//! The tuner facade: owns the reference model, the history window, the current
//! gains and the tuning state, and runs the per-tick pipeline.
//!
//! Every operation is total. Out-of-range configuration is coerced rather than
//! rejected, and non-finite measurements are skipped.
//!
//! A `Tuner` performs no I/O and reads no clock. It is not internally
//! synchronized: callers sharing one across threads must lock around it.

use crate::config::{AdaptationCfg, AdaptationThresholds, MIN_HISTORY, derived_min_data};
use crate::engine::{AdaptationEngine, Adjustment, DynamicsRule};
use crate::history::HistoryWindow;
use crate::limiter::{GainLimits, Gains};
use crate::mode::TuningMode;
use crate::reference_model::{ReferenceModel, ReferenceModelParams};

pub struct Tuner {
    pub(crate) model: ReferenceModel,
    pub(crate) history: HistoryWindow,
    pub(crate) engine: AdaptationEngine,
    pub(crate) adaptation: AdaptationCfg,
    pub(crate) limits: GainLimits,
    pub(crate) gains: Gains,
    pub(crate) mode: TuningMode,
    /// Samples recorded since the last `stop_active_tuning` or `reset`.
    pub(crate) fresh_samples: usize,
    pub(crate) rejected_samples: u64,
    pub(crate) last_adjustment: Option<Adjustment>,
}

impl core::fmt::Debug for Tuner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tuner")
            .field("mode", &self.mode)
            .field("gains", &self.gains)
            .field("model_output", &self.model.output())
            .field("samples", &self.history.len())
            .finish()
    }
}

impl Tuner {
    /// Feed one control tick.
    ///
    /// Always advances the reference model and records the tick, whatever the
    /// mode. While `Gathering`, promotes to `Active` once enough fresh samples
    /// exist; while `Active`, runs one adaptation pass.
    pub fn process_measurement(&mut self, setpoint: f64, plant_output: f64) {
        if !setpoint.is_finite() || !plant_output.is_finite() {
            self.rejected_samples = self.rejected_samples.saturating_add(1);
            tracing::warn!(
                setpoint,
                plant_output,
                rejected = self.rejected_samples,
                "non-finite measurement skipped"
            );
            return;
        }

        let model_output = self.model.advance(setpoint);
        let error = plant_output - model_output;
        self.history.record(error, plant_output, setpoint);
        self.fresh_samples = self.fresh_samples.saturating_add(1);
        tracing::trace!(setpoint, plant_output, model_output, error, "tick");

        if self.mode == TuningMode::Gathering && self.has_enough_data() {
            self.mode = TuningMode::Active;
            tracing::info!(
                samples = self.history.len(),
                min_data = self.adaptation.min_data_for_tuning,
                "tuning active"
            );
        }

        if self.mode == TuningMode::Active && self.has_enough_data_in_window() {
            self.adapt();
        }
    }

    fn adapt(&mut self) {
        let adj = self.engine.adapt(
            self.history.error(),
            self.gains,
            &self.adaptation,
            &self.limits,
        );
        if adj.bias_corrected || adj.dynamics != DynamicsRule::None {
            tracing::debug!(
                err_mean = adj.stats.mean,
                err_std_dev = adj.stats.std_dev,
                oscillations = adj.stats.oscillations,
                bias = adj.bias_corrected,
                rule = ?adj.dynamics,
                kp = adj.gains.kp,
                ki = adj.gains.ki,
                kd = adj.gains.kd,
                "gains adapted"
            );
        }
        self.gains = adj.gains;
        self.last_adjustment = Some(adj);
    }

    #[inline]
    fn has_enough_data_in_window(&self) -> bool {
        self.history.len() >= self.adaptation.min_data_for_tuning
    }

    #[inline]
    fn has_enough_data(&self) -> bool {
        self.has_enough_data_in_window()
            && self.fresh_samples >= self.adaptation.min_data_for_tuning
    }

    // ── State machine ────────────────────────────────────────────────────────

    /// Request tuning. From `Idle` this enters `Gathering`; otherwise a no-op.
    pub fn start_active_tuning(&mut self) {
        if self.mode == TuningMode::Idle {
            self.mode = TuningMode::Gathering;
            tracing::info!(
                min_data = self.adaptation.min_data_for_tuning,
                "tuning requested"
            );
        }
    }

    /// Withdraw the tuning request and discard data sufficiency.
    ///
    /// A following `start_active_tuning` must gather `min_data_for_tuning`
    /// new samples before the rules run again. Gains are kept.
    pub fn stop_active_tuning(&mut self) {
        if self.mode != TuningMode::Idle {
            tracing::info!(from = %self.mode, "tuning stopped");
        }
        self.mode = TuningMode::Idle;
        self.fresh_samples = 0;
    }

    /// Zero the reference model and clear all history.
    ///
    /// Keeps the tuning request and the current gains; an `Active` tuner
    /// drops back to `Gathering`.
    pub fn reset(&mut self) {
        self.model.reset();
        self.history.clear();
        self.fresh_samples = 0;
        self.last_adjustment = None;
        if self.mode == TuningMode::Active {
            self.mode = TuningMode::Gathering;
        }
        tracing::info!(mode = %self.mode, "tuner reset");
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Current clamped gains, for the caller to apply to the live controller.
    pub fn adapted_gains(&self) -> Gains {
        self.gains
    }

    /// Reference model output `y_m`.
    pub fn reference_model_output(&self) -> f64 {
        self.model.output()
    }

    pub fn is_actively_tuning(&self) -> bool {
        self.mode == TuningMode::Active
    }

    pub fn has_gathered_sufficient_data(&self) -> bool {
        self.mode == TuningMode::Active
    }

    pub fn mode(&self) -> TuningMode {
        self.mode
    }

    pub fn reference_model(&self) -> &ReferenceModel {
        &self.model
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn gain_limits(&self) -> &GainLimits {
        &self.limits
    }

    pub fn adaptation_cfg(&self) -> &AdaptationCfg {
        &self.adaptation
    }

    pub fn thresholds(&self) -> &AdaptationThresholds {
        self.engine.thresholds()
    }

    /// Count of ticks skipped because of a non-finite input.
    pub fn rejected_samples(&self) -> u64 {
        self.rejected_samples
    }

    /// Result of the most recent adaptation pass, if any since the last reset.
    pub fn last_adjustment(&self) -> Option<&Adjustment> {
        self.last_adjustment.as_ref()
    }

    // ── Configuration ────────────────────────────────────────────────────────

    pub fn set_reference_model_params(&mut self, omega_n: f64, zeta: f64) {
        self.model.set_params(omega_n, zeta);
    }

    /// Replace the gain bounds and re-clamp the current gains immediately.
    /// A `min` greater than its `max` is swapped; a NaN bound keeps the
    /// current value for that side.
    pub fn set_gain_limits(
        &mut self,
        min_kp: f64,
        max_kp: f64,
        min_ki: f64,
        max_ki: f64,
        min_kd: f64,
        max_kd: f64,
    ) {
        let given = [min_kp, max_kp, min_ki, max_ki, min_kd, max_kd];
        if given.iter().any(|v| v.is_nan()) {
            tracing::warn!(
                min_kp,
                max_kp,
                min_ki,
                max_ki,
                min_kd,
                max_kd,
                "NaN gain limit ignored; keeping the previous bound"
            );
        }
        let old = self.limits;
        let min_kp = or_previous(min_kp, old.kp.min());
        let max_kp = or_previous(max_kp, old.kp.max());
        let min_ki = or_previous(min_ki, old.ki.min());
        let max_ki = or_previous(max_ki, old.ki.max());
        let min_kd = or_previous(min_kd, old.kd.min());
        let max_kd = or_previous(max_kd, old.kd.max());
        if min_kp > max_kp || min_ki > max_ki || min_kd > max_kd {
            tracing::warn!(
                min_kp,
                max_kp,
                min_ki,
                max_ki,
                min_kd,
                max_kd,
                "gain limit given as min > max; swapping"
            );
        }
        self.limits = GainLimits::new(min_kp, max_kp, min_ki, max_ki, min_kd, max_kd);
        self.gains = self.limits.apply(self.gains);
    }

    /// Step sizes are stored as magnitudes.
    pub fn set_adaptation_step_sizes(&mut self, step_kp: f64, step_ki: f64, step_kd: f64) {
        self.adaptation = AdaptationCfg {
            step_kp,
            step_ki,
            step_kd,
            ..self.adaptation.clone()
        }
        .sanitized();
    }

    /// Negative aggressiveness is floored to 0.0.
    pub fn set_adaptation_aggressiveness(&mut self, aggressiveness: f64) {
        self.adaptation = AdaptationCfg {
            aggressiveness,
            ..self.adaptation.clone()
        }
        .sanitized();
    }

    /// Resize the history windows (floor `MIN_HISTORY`), truncating the oldest
    /// samples, and re-derive `min_data_for_tuning` as half the new size.
    pub fn set_history_size(&mut self, size: usize) {
        let size = size.max(MIN_HISTORY);
        self.adaptation.history_size = size;
        self.adaptation.min_data_for_tuning = derived_min_data(size);
        self.history.set_capacity(size);
    }

    /// Override the derived sample requirement (floor `MIN_HISTORY`).
    ///
    /// A value above the history size can never be reached; the tuner then
    /// stays in `Gathering` indefinitely.
    pub fn set_min_data_for_tuning(&mut self, samples: usize) {
        self.adaptation.min_data_for_tuning = samples.max(MIN_HISTORY);
    }

    pub fn set_thresholds(&mut self, thresholds: AdaptationThresholds) {
        self.engine.set_thresholds(thresholds);
    }
}

fn or_previous(value: f64, previous: f64) -> f64 {
    if value.is_nan() { previous } else { value }
}

impl Tuner {
    /// Construct with default limits, step sizes and thresholds.
    ///
    /// Shorthand for the builder; fails only on a non-finite or non-positive
    /// `dt` or non-finite initial gains.
    pub fn new(
        dt: f64,
        initial: Gains,
        omega_n: f64,
        zeta: f64,
    ) -> crate::error::Result<Self> {
        Self::builder()
            .with_dt(dt)
            .with_initial_gains(initial)
            .with_reference_model(ReferenceModelParams::new(omega_n, zeta))
            .build()
    }
}
