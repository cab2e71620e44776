//! `From` implementations bridging `tuner_config` types to `tuner_core` types.

use std::time::Duration;

use crate::config::{AdaptationCfg, AdaptationThresholds, derived_min_data};
use crate::error::Result;
use crate::limiter::{GainLimits, Gains};
use crate::reference_model::ReferenceModelParams;
use crate::runner::RunParams;
use crate::tuner::Tuner;

// ── Gains ────────────────────────────────────────────────────────────────────

impl From<&tuner_config::GainsCfg> for Gains {
    fn from(c: &tuner_config::GainsCfg) -> Self {
        Self::new(c.kp, c.ki, c.kd)
    }
}

impl From<&tuner_config::LimitsCfg> for GainLimits {
    fn from(c: &tuner_config::LimitsCfg) -> Self {
        Self::new(c.min_kp, c.max_kp, c.min_ki, c.max_ki, c.min_kd, c.max_kd)
    }
}

// ── Reference model ──────────────────────────────────────────────────────────

impl From<&tuner_config::ReferenceModelCfg> for ReferenceModelParams {
    fn from(c: &tuner_config::ReferenceModelCfg) -> Self {
        Self::new(c.omega_n, c.zeta)
    }
}

// ── Adaptation ───────────────────────────────────────────────────────────────

impl From<&tuner_config::AdaptationCfg> for AdaptationCfg {
    fn from(c: &tuner_config::AdaptationCfg) -> Self {
        Self {
            step_kp: c.step_kp,
            step_ki: c.step_ki,
            step_kd: c.step_kd,
            aggressiveness: c.aggressiveness,
            history_size: c.history_size,
            min_data_for_tuning: c
                .min_data_for_tuning
                .unwrap_or_else(|| derived_min_data(c.history_size)),
        }
    }
}

impl From<&tuner_config::ThresholdsCfg> for AdaptationThresholds {
    fn from(c: &tuner_config::ThresholdsCfg) -> Self {
        Self {
            bias_tolerance: c.bias_tolerance,
            std_dev_tolerance: c.std_dev_tolerance,
            sluggish_tolerance: c.sluggish_tolerance,
            oscillation_divisor: c.oscillation_divisor,
            sluggish_oscillation_divisor: c.sluggish_oscillation_divisor,
            sluggish_step_fraction: c.sluggish_step_fraction,
        }
    }
}

// ── Runner ───────────────────────────────────────────────────────────────────

impl From<&tuner_config::RunnerCfg> for RunParams {
    fn from(c: &tuner_config::RunnerCfg) -> Self {
        Self {
            ticks: c.ticks,
            apply_every: c.apply_every,
            start_tuning_after: Some(c.start_tuning_after),
            pace: c.pace,
            sample_timeout: Duration::from_millis(c.sample_timeout_ms),
        }
    }
}

// ── Whole config ─────────────────────────────────────────────────────────────

impl Tuner {
    /// Build a tuner from a parsed config. Call `Config::validate` first for
    /// strict checking; this only applies the builder's checks.
    pub fn from_config(cfg: &tuner_config::Config) -> Result<Self> {
        Self::builder()
            .with_dt(cfg.tuner.dt_s)
            .with_initial_gains(Gains::from(&cfg.initial_gains))
            .with_reference_model(ReferenceModelParams::from(&cfg.reference_model))
            .with_limits(GainLimits::from(&cfg.limits))
            .with_adaptation(AdaptationCfg::from(&cfg.adaptation))
            .with_thresholds(AdaptationThresholds::from(&cfg.thresholds))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
[tuner]
dt_s = 0.05

[initial_gains]
kp = 150.0
ki = 0.5
kd = 0.1

[adaptation]
history_size = 40

[runner]
ticks = 10
apply_every = 3
start_tuning_after = 4
"#;

    #[test]
    fn config_maps_onto_tuner() {
        let cfg = tuner_config::load_toml(TOML).unwrap();
        let t = Tuner::from_config(&cfg).unwrap();
        // kp outside default limits is clamped at construction
        assert_eq!(t.adapted_gains().kp, 100.0);
        assert_eq!(t.adaptation_cfg().history_size, 40);
        assert_eq!(t.adaptation_cfg().min_data_for_tuning, 20);
        assert_eq!(t.reference_model().dt(), 0.05);
        assert_eq!(t.history().capacity(), 40);
    }

    #[test]
    fn runner_cfg_maps_onto_params() {
        let cfg = tuner_config::load_toml(TOML).unwrap();
        let p = RunParams::from(&cfg.runner);
        assert_eq!(p.ticks, 10);
        assert_eq!(p.apply_every, 3);
        assert_eq!(p.start_tuning_after, Some(4));
        assert_eq!(p.sample_timeout, Duration::from_millis(100));
    }

    #[test]
    fn explicit_min_data_wins() {
        let c = tuner_config::AdaptationCfg {
            min_data_for_tuning: Some(12),
            ..Default::default()
        };
        assert_eq!(AdaptationCfg::from(&c).min_data_for_tuning, 12);
    }
}
