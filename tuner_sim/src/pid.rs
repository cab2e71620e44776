//! Parallel-form PID controller standing in for the live loop that receives
//! tuned gains.

#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    prev_error: Option<f64>,
    output_limit: f64,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: None,
            output_limit: f64::INFINITY,
        }
    }

    /// Saturate the output at `±limit`; the integrator stops accumulating
    /// while saturated.
    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = if limit.is_nan() {
            f64::INFINITY
        } else {
            limit.abs()
        };
        self
    }

    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    pub fn update(&mut self, setpoint: f64, measurement: f64, dt: f64) -> f64 {
        let error = setpoint - measurement;
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let candidate = self.integral + error * dt;
        let unclamped = self.kp * error + self.ki * candidate + self.kd * derivative;
        let out = unclamped.clamp(-self.output_limit, self.output_limit);
        // conditional integration
        if out == unclamped {
            self.integral = candidate;
        }
        out
    }
}
