#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Online adaptive PID gain tuning (model-reference, heuristic).
//!
//! The tuner observes one `(setpoint, plant_output)` pair per control tick,
//! compares the plant against a second-order reference model, and nudges the
//! caller's PID gains by small fixed steps. It never runs the controller
//! itself: the caller reads `adapted_gains()` and applies them to the live
//! loop (see `runner` for a ready-made driver over `tuner_traits`).
//!
//! ## Architecture
//!
//! - **Reference model**: Euler-integrated second-order system (`reference_model`)
//! - **History**: bounded ring windows of error, plant output and setpoint (`history`)
//! - **Adaptation**: bias, oscillation and sluggish rules (`engine`)
//! - **Limits**: per-gain clamping (`limiter`)
//! - **Facade**: `Tuner` and its `Idle → Gathering → Active` state machine
//!
//! ## Stability
//!
//! The rules are heuristics with no convergence guarantee. Bounded gains plus
//! small steps are the only safety net.

pub mod builder;
pub mod collab_error;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod history;
pub mod limiter;
pub mod mode;
pub mod reference_model;
pub mod runner;
pub mod tuner;
pub mod util;

pub use builder::TunerBuilder;
pub use config::{AdaptationCfg, AdaptationThresholds, MIN_HISTORY};
pub use engine::{AdaptationEngine, Adjustment, DynamicsRule, ErrorStats};
pub use error::{BuildError, Result, TunerError};
pub use history::{HistoryBuffer, HistoryWindow};
pub use limiter::{GainBounds, GainLimits, Gains};
pub use mode::TuningMode;
pub use reference_model::{ReferenceModel, ReferenceModelParams, ReferenceModelState};
pub use runner::{RunParams, RunSummary, TickRecord};
pub use tuner::Tuner;
