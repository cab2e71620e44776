//! Heuristic gain adaptation driven by reference-model tracking error.
//!
//! The adaptation error is `plant_output - model_output`. Its window statistics
//! are mapped to gain nudges by three rules evaluated in a fixed order:
//!
//! 1. **Bias** (always evaluated): a persistent signed mean means the integral
//!    action is miscalibrated, so `ki` moves against the sign of the mean.
//! 2. **Oscillation**: many sign changes or a wide spread lower `kp` and raise `kd`.
//! 3. **Sluggish** (only when 2 did not fire): a large mean with few sign changes
//!    moves `kp` by a fraction of its step toward reducing `|mean|`.
//!
//! The result always passes through the gain limits before it is returned.

use crate::config::{AdaptationCfg, AdaptationThresholds};
use crate::history::HistoryBuffer;
use crate::limiter::{GainLimits, Gains};

/// Descriptive statistics of the adaptation-error window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStats {
    pub mean: f64,
    pub std_dev: f64,
    pub oscillations: usize,
    pub samples: usize,
}

impl ErrorStats {
    pub fn from_history(history: &HistoryBuffer) -> Self {
        let mean = history.mean();
        Self {
            mean,
            std_dev: history.std_dev(mean),
            oscillations: history.sign_change_count(),
            samples: history.len(),
        }
    }
}

/// Which correction fired on the Kp/Kd axis this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicsRule {
    None,
    Oscillation,
    Sluggish,
}

/// Outcome of one adaptation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub stats: ErrorStats,
    pub bias_corrected: bool,
    pub dynamics: DynamicsRule,
    /// Gains after clamping.
    pub gains: Gains,
}

/// Stateless rule set; all inputs arrive per call.
#[derive(Debug, Clone, Default)]
pub struct AdaptationEngine {
    thresholds: AdaptationThresholds,
}

impl AdaptationEngine {
    pub fn new(thresholds: AdaptationThresholds) -> Self {
        Self {
            thresholds: thresholds.sanitized(),
        }
    }

    pub fn thresholds(&self) -> &AdaptationThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: AdaptationThresholds) {
        self.thresholds = thresholds.sanitized();
    }

    /// Sign-change count above which the loop is treated as oscillating.
    #[inline]
    pub fn oscillation_threshold(&self, history_size: usize) -> usize {
        history_size / self.thresholds.oscillation_divisor.max(1)
    }

    /// Evaluate the rules against `errors` and return clamped gains.
    pub fn adapt(
        &self,
        errors: &HistoryBuffer,
        current: Gains,
        cfg: &AdaptationCfg,
        limits: &GainLimits,
    ) -> Adjustment {
        let t = &self.thresholds;
        let stats = ErrorStats::from_history(errors);

        let step_kp = cfg.step_kp * cfg.aggressiveness;
        let step_ki = cfg.step_ki * cfg.aggressiveness;
        let step_kd = cfg.step_kd * cfg.aggressiveness;

        let mut next = current;

        // Steady-state bias -> integral action
        let bias_corrected = stats.mean.abs() > t.bias_tolerance;
        if bias_corrected {
            if stats.mean > 0.0 {
                next.ki -= step_ki;
            } else {
                next.ki += step_ki;
            }
        }

        let osc_threshold = self.oscillation_threshold(cfg.history_size);
        let sluggish_limit = osc_threshold / t.sluggish_oscillation_divisor.max(1);

        let dynamics = if stats.oscillations > osc_threshold || stats.std_dev > t.std_dev_tolerance
        {
            next.kp -= step_kp;
            next.kd += step_kd;
            DynamicsRule::Oscillation
        } else if stats.mean.abs() > t.sluggish_tolerance && stats.oscillations < sluggish_limit {
            let nudge = step_kp * t.sluggish_step_fraction;
            if stats.mean < 0.0 {
                // plant lagging the model
                next.kp += nudge;
            } else {
                next.kp -= nudge;
            }
            DynamicsRule::Sluggish
        } else {
            DynamicsRule::None
        };

        Adjustment {
            stats,
            bias_corrected,
            dynamics,
            gains: limits.apply(next),
        }
    }
}
