//! Type-state builder for `Tuner`.
//!
//! `build()` is only available once the sample period and the initial gains
//! are set. `try_build()` is always available and reports what is missing.

use std::marker::PhantomData;

use crate::config::{AdaptationCfg, AdaptationThresholds};
use crate::engine::AdaptationEngine;
use crate::error::{BuildError, Result};
use crate::history::HistoryWindow;
use crate::limiter::{GainLimits, Gains};
use crate::mode::TuningMode;
use crate::reference_model::{ReferenceModel, ReferenceModelParams};
use crate::tuner::Tuner;

impl Tuner {
    /// Start building a Tuner.
    pub fn builder() -> TunerBuilder<Missing, Missing> {
        TunerBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Tuner`. Everything except dt and the initial gains has a default.
pub struct TunerBuilder<D, G> {
    dt: Option<f64>,
    gains: Option<Gains>,
    reference: Option<ReferenceModelParams>,
    limits: Option<GainLimits>,
    adaptation: Option<AdaptationCfg>,
    thresholds: Option<AdaptationThresholds>,
    start_tuning: bool,
    _d: PhantomData<D>,
    _g: PhantomData<G>,
}

impl Default for TunerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            dt: None,
            gains: None,
            reference: None,
            limits: None,
            adaptation: None,
            thresholds: None,
            start_tuning: false,
            _d: PhantomData,
            _g: PhantomData,
        }
    }
}

/// Validate inputs and construct the tuner. Shared by `try_build` and `build`.
fn validate_and_build(
    dt: f64,
    initial: Gains,
    reference: ReferenceModelParams,
    limits: GainLimits,
    adaptation: AdaptationCfg,
    thresholds: AdaptationThresholds,
    start_tuning: bool,
) -> Result<Tuner> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "dt must be finite and > 0",
        )));
    }
    if !initial.is_finite() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "initial gains must be finite",
        )));
    }
    let bounds = [limits.kp, limits.ki, limits.kd];
    if bounds.iter().any(|b| b.min().is_nan() || b.max().is_nan()) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "gain limits must not be NaN",
        )));
    }

    let adaptation = adaptation.sanitized();
    let gains = limits.apply(initial);
    if gains != initial {
        tracing::warn!(
            kp = initial.kp,
            ki = initial.ki,
            kd = initial.kd,
            "initial gains outside limits; clamped"
        );
    }

    let mode = if start_tuning {
        TuningMode::Gathering
    } else {
        TuningMode::Idle
    };

    Ok(Tuner {
        model: ReferenceModel::new(dt, reference),
        history: HistoryWindow::with_capacity(adaptation.history_size),
        engine: AdaptationEngine::new(thresholds),
        adaptation,
        limits,
        gains,
        mode,
        fresh_samples: 0,
        rejected_samples: 0,
        last_adjustment: None,
    })
}

impl<D, G> TunerBuilder<D, G> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Tuner> {
        let dt = self
            .dt
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDt))?;
        let gains = self
            .gains
            .ok_or_else(|| eyre::Report::new(BuildError::MissingGains))?;
        validate_and_build(
            dt,
            gains,
            self.reference.unwrap_or_default(),
            self.limits.unwrap_or_default(),
            self.adaptation.unwrap_or_default(),
            self.thresholds.unwrap_or_default(),
            self.start_tuning,
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<D, G> TunerBuilder<D, G> {
    pub fn with_reference_model(mut self, params: ReferenceModelParams) -> Self {
        self.reference = Some(params);
        self
    }
    pub fn with_limits(mut self, limits: GainLimits) -> Self {
        self.limits = Some(limits);
        self
    }
    pub fn with_adaptation(mut self, adaptation: AdaptationCfg) -> Self {
        self.adaptation = Some(adaptation);
        self
    }
    pub fn with_thresholds(mut self, thresholds: AdaptationThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
    /// Build the tuner already in `Gathering`.
    pub fn start_tuning(mut self, yes: bool) -> Self {
        self.start_tuning = yes;
        self
    }
}

// Setters that advance type-state
impl<G> TunerBuilder<Missing, G> {
    /// Sample period in seconds.
    pub fn with_dt(self, dt: f64) -> TunerBuilder<Set, G> {
        TunerBuilder {
            dt: Some(dt),
            gains: self.gains,
            reference: self.reference,
            limits: self.limits,
            adaptation: self.adaptation,
            thresholds: self.thresholds,
            start_tuning: self.start_tuning,
            _d: PhantomData,
            _g: PhantomData,
        }
    }
}

impl<D> TunerBuilder<D, Missing> {
    pub fn with_initial_gains(self, gains: Gains) -> TunerBuilder<D, Set> {
        TunerBuilder {
            dt: self.dt,
            gains: Some(gains),
            reference: self.reference,
            limits: self.limits,
            adaptation: self.adaptation,
            thresholds: self.thresholds,
            start_tuning: self.start_tuning,
            _d: PhantomData,
            _g: PhantomData,
        }
    }
}

impl TunerBuilder<Set, Set> {
    pub fn build(self) -> Result<Tuner> {
        self.try_build()
    }
}
