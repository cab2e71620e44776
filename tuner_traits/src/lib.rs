pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One control-tick observation taken from the live loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Commanded setpoint `r` for this tick.
    pub setpoint: f64,
    /// Measured plant output `y_p` for this tick.
    pub plant_output: f64,
}

impl Measurement {
    pub fn new(setpoint: f64, plant_output: f64) -> Self {
        Self {
            setpoint,
            plant_output,
        }
    }
}

/// Upstream collaborator: yields one `(setpoint, plant_output)` pair per tick.
pub trait MeasurementSource {
    fn sample(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Measurement, Box<dyn std::error::Error + Send + Sync>>;
}

/// Downstream collaborator: the live PID controller that receives tuned gains.
pub trait GainSink {
    fn apply_gains(
        &mut self,
        kp: f64,
        ki: f64,
        kd: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
