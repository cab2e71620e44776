//! Second-order reference model the plant is expected to follow.
//!
//! State-space form of `y'' + 2·ζ·ωn·y' + ωn²·y = ωn²·r`:
//!
//! ```text
//! x1' = x2
//! x2' = -ωn²·x1 - 2·ζ·ωn·x2 + ωn²·r
//! ```
//!
//! integrated with explicit (forward) Euler at a fixed step `dt`.

/// Floor applied to `omega_n` and `zeta` on assignment.
pub const MIN_MODEL_PARAM: f64 = 0.01;

/// Simulated position (`x1`, the model output) and velocity (`x2`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceModelState {
    pub x1: f64,
    pub x2: f64,
}

/// Natural frequency (rad/s) and damping ratio of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceModelParams {
    omega_n: f64,
    zeta: f64,
}

impl Default for ReferenceModelParams {
    fn default() -> Self {
        Self {
            omega_n: 1.0,
            zeta: 1.0,
        }
    }
}

impl ReferenceModelParams {
    /// Both parameters are floored to `MIN_MODEL_PARAM` (NaN maps to the floor).
    pub fn new(omega_n: f64, zeta: f64) -> Self {
        Self {
            omega_n: omega_n.max(MIN_MODEL_PARAM),
            zeta: zeta.max(MIN_MODEL_PARAM),
        }
    }

    pub fn omega_n(&self) -> f64 {
        self.omega_n
    }

    pub fn zeta(&self) -> f64 {
        self.zeta
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceModel {
    state: ReferenceModelState,
    params: ReferenceModelParams,
    dt: f64,
}

impl ReferenceModel {
    /// Create a zeroed model. `dt` is fixed for the model's lifetime; the
    /// builder rejects non-finite or non-positive values before this point.
    pub fn new(dt: f64, params: ReferenceModelParams) -> Self {
        Self {
            state: ReferenceModelState::default(),
            params,
            dt,
        }
    }

    /// Integrate one step toward `setpoint` and return the new model output.
    pub fn advance(&mut self, setpoint: f64) -> f64 {
        let ReferenceModelState { x1, x2 } = self.state;
        let wn = self.params.omega_n;
        let wn2 = wn * wn;
        let zeta = self.params.zeta;

        self.state.x1 = x1 + self.dt * x2;
        self.state.x2 = x2 + self.dt * (-wn2 * x1 - 2.0 * zeta * wn * x2 + wn2 * setpoint);
        self.state.x1
    }

    pub fn reset(&mut self) {
        self.state = ReferenceModelState::default();
    }

    /// Replace the parameters; effective from the next `advance`.
    pub fn set_params(&mut self, omega_n: f64, zeta: f64) {
        self.params = ReferenceModelParams::new(omega_n, zeta);
    }

    pub fn params(&self) -> ReferenceModelParams {
        self.params
    }

    pub fn state(&self) -> ReferenceModelState {
        self.state
    }

    /// Model output `y_m` (`x1`).
    pub fn output(&self) -> f64 {
        self.state.x1
    }

    /// Model output derivative (`x2`).
    pub fn velocity(&self) -> f64 {
        self.state.x2
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}
