#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Simulation backend for the gain tuner.
//!
//! Provides a closed-loop simulated axis (plant + PID) and scripted
//! collaborators implementing the `tuner_traits` interfaces.

pub mod axis;
pub mod error;
pub mod pid;
pub mod plant;
pub mod profile;

use std::collections::VecDeque;
use std::time::Duration;

use tuner_traits::{GainSink, Measurement, MeasurementSource};

pub use axis::{AxisSink, AxisSource, SimFault, SimulatedAxis};
pub use error::SimError;
pub use pid::PidController;
pub use plant::Plant;
pub use profile::SetpointProfile;

/// Replays a fixed sequence of measurements, then fails with `Exhausted`.
pub struct ScriptedSource {
    items: VecDeque<Result<Measurement, SimError>>,
    served: usize,
}

impl ScriptedSource {
    pub fn new(items: impl IntoIterator<Item = Measurement>) -> Self {
        Self {
            items: items.into_iter().map(Ok).collect(),
            served: 0,
        }
    }

    /// Script that may contain errors.
    pub fn from_results(items: impl IntoIterator<Item = Result<Measurement, SimError>>) -> Self {
        Self {
            items: items.into_iter().collect(),
            served: 0,
        }
    }

    /// `(setpoint, plant_output)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(pairs.into_iter().map(|(r, y)| Measurement::new(r, y)))
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl MeasurementSource for ScriptedSource {
    fn sample(
        &mut self,
        _timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>> {
        match self.items.pop_front() {
            Some(Ok(m)) => {
                self.served += 1;
                Ok(m)
            }
            Some(Err(e)) => Err(Box::new(e)),
            None => Err(Box::new(SimError::Exhausted(self.served))),
        }
    }
}

/// Gain sink that records every applied triple.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub applied: Vec<(f64, f64, f64)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<(f64, f64, f64)> {
        self.applied.last().copied()
    }
}

impl GainSink for RecordingSink {
    fn apply_gains(
        &mut self,
        kp: f64,
        ki: f64,
        kd: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.applied.push((kp, ki, kd));
        Ok(())
    }
}
