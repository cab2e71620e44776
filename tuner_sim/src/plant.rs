//! Two cascaded first-order lags driven by the controller output.
//!
//! Each lag is discretized exactly (`1 - e^(-dt/tau)`), so the plant stays
//! stable for any positive `dt`.

#[derive(Debug, Clone)]
pub struct Plant {
    gain: f64,
    time_constant_s: f64,
    inertia_s: f64,
    inner: f64,
    output: f64,
}

impl Plant {
    /// `inertia_s <= 0` disables the second lag.
    pub fn new(gain: f64, time_constant_s: f64, inertia_s: f64) -> Self {
        Self {
            gain,
            time_constant_s,
            inertia_s,
            inner: 0.0,
            output: 0.0,
        }
    }

    /// Advance by `dt` seconds with control input `u`; returns the new output.
    pub fn step(&mut self, u: f64, dt: f64) -> f64 {
        self.inner += lag_factor(dt, self.time_constant_s) * (self.gain * u - self.inner);
        if self.inertia_s > 0.0 {
            self.output += lag_factor(dt, self.inertia_s) * (self.inner - self.output);
        } else {
            self.output = self.inner;
        }
        self.output
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

#[inline]
fn lag_factor(dt: f64, tau: f64) -> f64 {
    if tau <= 0.0 {
        1.0
    } else {
        1.0 - (-dt / tau).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_at_static_gain() {
        let mut p = Plant::new(2.0, 0.5, 0.2);
        for _ in 0..500 {
            p.step(1.5, 0.1);
        }
        assert!((p.output() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn single_lag_without_inertia() {
        let mut p = Plant::new(1.0, 1.0, 0.0);
        let y = p.step(1.0, 1.0);
        assert!((y - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }
}
