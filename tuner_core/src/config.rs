//! Configuration types for the tuning engine.
//!
//! These are the runtime configuration structs used by `Tuner`.
//! They are separate from the TOML-deserialized config in `tuner_config`.

/// Smallest history window (and smallest `min_data_for_tuning`) the tuner accepts.
pub const MIN_HISTORY: usize = 10;

/// Default history window: 10 s of data at `dt = 0.1 s`.
pub const DEFAULT_HISTORY: usize = 100;

/// Derive the sample count required before adaptation may run.
#[inline]
pub fn derived_min_data(history_size: usize) -> usize {
    (history_size / 2).max(MIN_HISTORY)
}

/// Step sizes and data-window sizing for the adaptation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationCfg {
    /// Kp step per adjustment (before aggressiveness).
    pub step_kp: f64,
    /// Ki step per adjustment (before aggressiveness).
    pub step_ki: f64,
    /// Kd step per adjustment (before aggressiveness).
    pub step_kd: f64,
    /// Uniform multiplier applied to every step size. 0.0 freezes the gains.
    pub aggressiveness: f64,
    /// Capacity of the error / plant-output / setpoint windows.
    pub history_size: usize,
    /// Samples required before the first adaptation of a tuning session.
    pub min_data_for_tuning: usize,
}

impl Default for AdaptationCfg {
    fn default() -> Self {
        Self {
            step_kp: 0.01,
            step_ki: 0.001,
            step_kd: 0.001,
            aggressiveness: 1.0,
            history_size: DEFAULT_HISTORY,
            min_data_for_tuning: derived_min_data(DEFAULT_HISTORY),
        }
    }
}

impl AdaptationCfg {
    /// Return a copy with every field coerced into its accepted range.
    ///
    /// Negative steps become their magnitude, negative (or NaN) aggressiveness
    /// becomes 0.0, and window sizes are raised to `MIN_HISTORY`.
    pub fn sanitized(&self) -> Self {
        Self {
            step_kp: abs_or_zero(self.step_kp),
            step_ki: abs_or_zero(self.step_ki),
            step_kd: abs_or_zero(self.step_kd),
            aggressiveness: non_negative(self.aggressiveness),
            history_size: self.history_size.max(MIN_HISTORY),
            min_data_for_tuning: self.min_data_for_tuning.max(MIN_HISTORY),
        }
    }
}

/// Empirical thresholds for the heuristic rule set.
///
/// Not derived from a stability result; kept overridable so they can be
/// retuned against real hardware.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationThresholds {
    /// `|mean error|` above which the integral gain is nudged.
    pub bias_tolerance: f64,
    /// Error standard deviation above which the loop is treated as oscillating.
    pub std_dev_tolerance: f64,
    /// `|mean error|` above which a non-oscillating loop is treated as sluggish.
    pub sluggish_tolerance: f64,
    /// Oscillation threshold is `history_size / oscillation_divisor` sign changes.
    pub oscillation_divisor: usize,
    /// Sluggish rule requires fewer than `threshold / sluggish_oscillation_divisor` sign changes.
    pub sluggish_oscillation_divisor: usize,
    /// Fraction of the Kp step used by the sluggish correction.
    pub sluggish_step_fraction: f64,
}

impl Default for AdaptationThresholds {
    fn default() -> Self {
        Self {
            bias_tolerance: 0.01,
            std_dev_tolerance: 0.1,
            sluggish_tolerance: 0.05,
            oscillation_divisor: 10,
            sluggish_oscillation_divisor: 2,
            sluggish_step_fraction: 0.5,
        }
    }
}

impl AdaptationThresholds {
    /// Return a copy with tolerances made non-negative and divisors at least 1.
    pub fn sanitized(&self) -> Self {
        Self {
            bias_tolerance: abs_or_zero(self.bias_tolerance),
            std_dev_tolerance: abs_or_zero(self.std_dev_tolerance),
            sluggish_tolerance: abs_or_zero(self.sluggish_tolerance),
            oscillation_divisor: self.oscillation_divisor.max(1),
            sluggish_oscillation_divisor: self.sluggish_oscillation_divisor.max(1),
            sluggish_step_fraction: abs_or_zero(self.sluggish_step_fraction),
        }
    }
}

#[inline]
fn abs_or_zero(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.abs() }
}

#[inline]
fn non_negative(x: f64) -> f64 {
    // f64::max returns the non-NaN operand
    x.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_min_data_is_half_with_floor() {
        assert_eq!(derived_min_data(100), 50);
        assert_eq!(derived_min_data(21), 10);
        assert_eq!(derived_min_data(10), 10);
        assert_eq!(derived_min_data(0), MIN_HISTORY);
    }

    #[test]
    fn sanitized_adaptation_coerces_ranges() {
        let cfg = AdaptationCfg {
            step_kp: -0.5,
            step_ki: f64::NAN,
            step_kd: 0.2,
            aggressiveness: -3.0,
            history_size: 2,
            min_data_for_tuning: 0,
        }
        .sanitized();
        assert_eq!(cfg.step_kp, 0.5);
        assert_eq!(cfg.step_ki, 0.0);
        assert_eq!(cfg.step_kd, 0.2);
        assert_eq!(cfg.aggressiveness, 0.0);
        assert_eq!(cfg.history_size, MIN_HISTORY);
        assert_eq!(cfg.min_data_for_tuning, MIN_HISTORY);
    }

    #[test]
    fn sanitized_thresholds_keep_divisors_positive() {
        let t = AdaptationThresholds {
            oscillation_divisor: 0,
            sluggish_oscillation_divisor: 0,
            bias_tolerance: -0.02,
            ..AdaptationThresholds::default()
        }
        .sanitized();
        assert_eq!(t.oscillation_divisor, 1);
        assert_eq!(t.sluggish_oscillation_divisor, 1);
        assert_eq!(t.bias_tolerance, 0.02);
    }
}
