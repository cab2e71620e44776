//! Closed-loop simulated axis: a `Plant` under a `PidController`.
//!
//! `SimulatedAxis::split` hands out a measurement source and a gain sink that
//! share one loop, so a runner can read from one and write tuned gains to the
//! other.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tuner_traits::{GainSink, Measurement, MeasurementSource};

use crate::error::SimError;
use crate::pid::PidController;
use crate::plant::Plant;
use crate::profile::SetpointProfile;

/// Injected failure for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// `sample` times out at the given tick.
    TimeoutAt(u64),
    /// `apply_gains` fails on the given call (0-based).
    SinkFaultAt(u64),
}

#[derive(Debug)]
struct AxisState {
    plant: Plant,
    pid: PidController,
    profile: SetpointProfile,
    dt_s: f64,
    tick: u64,
    applies: u64,
    fault: Option<SimFault>,
}

#[derive(Debug)]
pub struct SimulatedAxis {
    state: Rc<RefCell<AxisState>>,
}

impl SimulatedAxis {
    pub fn new(plant: Plant, pid: PidController, profile: SetpointProfile, dt_s: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(AxisState {
                plant,
                pid,
                profile,
                dt_s,
                tick: 0,
                applies: 0,
                fault: None,
            })),
        }
    }

    pub fn with_fault(self, fault: SimFault) -> Self {
        self.state.borrow_mut().fault = Some(fault);
        self
    }

    /// Source and sink views onto the same loop.
    pub fn split(&self) -> (AxisSource, AxisSink) {
        (
            AxisSource {
                state: Rc::clone(&self.state),
            },
            AxisSink {
                state: Rc::clone(&self.state),
            },
        )
    }

    /// Gains currently used by the simulated controller.
    pub fn controller_gains(&self) -> (f64, f64, f64) {
        self.state.borrow().pid.gains()
    }

    pub fn plant_output(&self) -> f64 {
        self.state.borrow().plant.output()
    }

    pub fn ticks(&self) -> u64 {
        self.state.borrow().tick
    }
}

pub struct AxisSource {
    state: Rc<RefCell<AxisState>>,
}

impl MeasurementSource for AxisSource {
    fn sample(
        &mut self,
        _timeout: Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self.state.borrow_mut();
        if s.fault == Some(SimFault::TimeoutAt(s.tick)) {
            tracing::debug!(tick = s.tick, "injected timeout");
            return Err(Box::new(SimError::Timeout));
        }
        let dt = s.dt_s;
        let setpoint = s.profile.at(s.tick);
        let measured = s.plant.output();
        let u = s.pid.update(setpoint, measured, dt);
        let plant_output = s.plant.step(u, dt);
        s.tick += 1;
        tracing::trace!(setpoint, u, plant_output, "sim tick");
        Ok(Measurement::new(setpoint, plant_output))
    }
}

pub struct AxisSink {
    state: Rc<RefCell<AxisState>>,
}

impl GainSink for AxisSink {
    fn apply_gains(
        &mut self,
        kp: f64,
        ki: f64,
        kd: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self.state.borrow_mut();
        let call = s.applies;
        s.applies += 1;
        if s.fault == Some(SimFault::SinkFaultAt(call)) {
            return Err(Box::new(SimError::Fault(format!(
                "controller rejected gains on call {call}"
            ))));
        }
        s.pid.set_gains(kp, ki, kd);
        Ok(())
    }
}
