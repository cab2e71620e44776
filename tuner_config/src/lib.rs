#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and setpoint-profile parsing for the gain tuner.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The profile CSV loader enforces headers and tick ordering.
use serde::Deserialize;

/// Sample period of the control loop.
#[derive(Debug, Deserialize)]
pub struct TunerSection {
    /// Seconds between ticks; also the reference model's integration step.
    pub dt_s: f64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GainsCfg {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReferenceModelCfg {
    /// Natural frequency in rad/s
    pub omega_n: f64,
    pub zeta: f64,
}

impl Default for ReferenceModelCfg {
    fn default() -> Self {
        Self {
            omega_n: 1.0,
            zeta: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsCfg {
    pub min_kp: f64,
    pub max_kp: f64,
    pub min_ki: f64,
    pub max_ki: f64,
    pub min_kd: f64,
    pub max_kd: f64,
}

impl Default for LimitsCfg {
    fn default() -> Self {
        Self {
            min_kp: 0.0,
            max_kp: 100.0,
            min_ki: 0.0,
            max_ki: 100.0,
            min_kd: 0.0,
            max_kd: 100.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdaptationCfg {
    pub step_kp: f64,
    pub step_ki: f64,
    pub step_kd: f64,
    pub aggressiveness: f64,
    pub history_size: usize,
    /// Defaults to half of `history_size` (at least 10) when absent.
    pub min_data_for_tuning: Option<usize>,
}

impl Default for AdaptationCfg {
    fn default() -> Self {
        Self {
            step_kp: 0.01,
            step_ki: 0.001,
            step_kd: 0.001,
            aggressiveness: 1.0,
            history_size: 100,
            min_data_for_tuning: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsCfg {
    pub bias_tolerance: f64,
    pub std_dev_tolerance: f64,
    pub sluggish_tolerance: f64,
    pub oscillation_divisor: usize,
    pub sluggish_oscillation_divisor: usize,
    pub sluggish_step_fraction: f64,
}

impl Default for ThresholdsCfg {
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

/// Simulated plant: two cascaded first-order lags.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlantCfg {
    /// Static gain from controller output to plant output
    pub gain: f64,
    /// Primary lag (s), must be > 0
    pub time_constant_s: f64,
    /// Secondary lag (s); 0 disables it
    pub inertia_s: f64,
    /// Saturation of the simulated controller output, must be > 0
    pub output_limit: f64,
}

impl Default for PlantCfg {
    fn default() -> Self {
        Self {
            gain: 1.0,
            time_constant_s: 1.0,
            inertia_s: 0.0,
            output_limit: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Step,
    Square,
    Sine,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProfileCfg {
    pub kind: ProfileKind,
    pub amplitude: f64,
    /// Added to every setpoint
    pub offset: f64,
    /// Period of square/sine profiles in seconds; ignored for step
    pub period_s: f64,
}

impl Default for ProfileCfg {
    fn default() -> Self {
        Self {
            kind: ProfileKind::Step,
            amplitude: 1.0,
            offset: 0.0,
            period_s: 20.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Number of ticks to simulate
    pub ticks: u64,
    /// Push gains to the controller every N ticks
    pub apply_every: u64,
    /// Request tuning once this many ticks have run
    pub start_tuning_after: u64,
    /// Sleep between ticks to run in real time
    pub pace: bool,
    /// Per-tick measurement timeout (ms)
    pub sample_timeout_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            ticks: 600,
            apply_every: 1,
            start_tuning_after: 0,
            pace: false,
            sample_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub tuner: TunerSection,
    pub initial_gains: GainsCfg,
    #[serde(default)]
    pub reference_model: ReferenceModelCfg,
    #[serde(default)]
    pub limits: LimitsCfg,
    #[serde(default)]
    pub adaptation: AdaptationCfg,
    #[serde(default)]
    pub thresholds: ThresholdsCfg,
    #[serde(default)]
    pub plant: PlantCfg,
    #[serde(default)]
    pub profile: ProfileCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// One row of a setpoint-profile CSV.
///
/// Expected headers:
/// tick,setpoint
///
/// Example:
/// tick,setpoint
/// 0,0.0
/// 50,1.0
/// 300,-0.5
///
/// Each setpoint holds until the next row's tick.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub tick: u64,
    pub setpoint: f64,
}

pub fn load_profile_csv(path: &std::path::Path) -> eyre::Result<Vec<ProfilePoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open profile CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["tick", "setpoint"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "profile CSV must have headers 'tick,setpoint', got: {}",
            actual.join(",")
        );
    }

    let mut points: Vec<ProfilePoint> = Vec::new();
    for (idx, rec) in rdr.deserialize::<ProfilePoint>().enumerate() {
        let line = idx + 2;
        let p = match rec {
            Ok(p) => p,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", line, e),
        };
        if !p.setpoint.is_finite() {
            eyre::bail!("profile row {} has a non-finite setpoint", line);
        }
        if let Some(prev) = points.last()
            && p.tick <= prev.tick
        {
            eyre::bail!(
                "profile ticks must be strictly increasing (row {}: {} after {})",
                line,
                p.tick,
                prev.tick
            );
        }
        points.push(p);
    }
    if points.is_empty() {
        eyre::bail!("profile CSV {:?} has no rows", path);
    }
    Ok(points)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Tuner
        if !(self.tuner.dt_s.is_finite() && self.tuner.dt_s > 0.0) {
            eyre::bail!("tuner.dt_s must be finite and > 0");
        }

        // Reference model
        let rm = &self.reference_model;
        if !(rm.omega_n.is_finite() && rm.omega_n > 0.0) {
            eyre::bail!("reference_model.omega_n must be finite and > 0");
        }
        if !(rm.zeta.is_finite() && rm.zeta > 0.0) {
            eyre::bail!("reference_model.zeta must be finite and > 0");
        }

        // Limits and initial gains
        let l = &self.limits;
        let g = &self.initial_gains;
        for (name, lo, hi, v) in [
            ("kp", l.min_kp, l.max_kp, g.kp),
            ("ki", l.min_ki, l.max_ki, g.ki),
            ("kd", l.min_kd, l.max_kd, g.kd),
        ] {
            if lo.is_nan() || hi.is_nan() {
                eyre::bail!("limits.min_{name}/max_{name} must not be NaN");
            }
            if lo > hi {
                eyre::bail!("limits.min_{name} must be <= limits.max_{name}");
            }
            if !v.is_finite() {
                eyre::bail!("initial_gains.{name} must be finite");
            }
            if v < lo || v > hi {
                eyre::bail!("initial_gains.{name} must be within [{lo}, {hi}]");
            }
        }

        // Adaptation
        let a = &self.adaptation;
        for (name, v) in [
            ("step_kp", a.step_kp),
            ("step_ki", a.step_ki),
            ("step_kd", a.step_kd),
            ("aggressiveness", a.aggressiveness),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                eyre::bail!("adaptation.{name} must be finite and >= 0");
            }
        }
        if a.history_size < 10 {
            eyre::bail!("adaptation.history_size must be >= 10");
        }
        if let Some(min) = a.min_data_for_tuning {
            if min < 10 {
                eyre::bail!("adaptation.min_data_for_tuning must be >= 10");
            }
            if min > a.history_size {
                eyre::bail!("adaptation.min_data_for_tuning must be <= adaptation.history_size");
            }
        }

        // Thresholds
        let t = &self.thresholds;
        for (name, v) in [
            ("bias_tolerance", t.bias_tolerance),
            ("std_dev_tolerance", t.std_dev_tolerance),
            ("sluggish_tolerance", t.sluggish_tolerance),
            ("sluggish_step_fraction", t.sluggish_step_fraction),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                eyre::bail!("thresholds.{name} must be finite and >= 0");
            }
        }
        if t.oscillation_divisor == 0 {
            eyre::bail!("thresholds.oscillation_divisor must be >= 1");
        }
        if t.sluggish_oscillation_divisor == 0 {
            eyre::bail!("thresholds.sluggish_oscillation_divisor must be >= 1");
        }

        // Plant
        if !self.plant.gain.is_finite() {
            eyre::bail!("plant.gain must be finite");
        }
        if !(self.plant.time_constant_s.is_finite() && self.plant.time_constant_s > 0.0) {
            eyre::bail!("plant.time_constant_s must be finite and > 0");
        }
        if !(self.plant.inertia_s.is_finite() && self.plant.inertia_s >= 0.0) {
            eyre::bail!("plant.inertia_s must be finite and >= 0");
        }
        if self.plant.output_limit.is_nan() || self.plant.output_limit <= 0.0 {
            eyre::bail!("plant.output_limit must be > 0");
        }

        // Profile
        if !self.profile.amplitude.is_finite() || !self.profile.offset.is_finite() {
            eyre::bail!("profile.amplitude and profile.offset must be finite");
        }
        if self.profile.kind != ProfileKind::Step
            && !(self.profile.period_s.is_finite() && self.profile.period_s > 0.0)
        {
            eyre::bail!("profile.period_s must be finite and > 0");
        }

        // Runner
        if self.runner.apply_every == 0 {
            eyre::bail!("runner.apply_every must be >= 1");
        }
        if self.runner.sample_timeout_ms == 0 {
            eyre::bail!("runner.sample_timeout_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
