//! Setpoint generators for simulated runs.

use std::f64::consts::TAU;

/// Setpoint as a function of the tick index.
#[derive(Debug, Clone, PartialEq)]
pub enum SetpointProfile {
    /// `offset + amplitude` from tick 0 on.
    Step { amplitude: f64, offset: f64 },
    /// Alternates `offset ± amplitude`, starting high, every half period.
    Square {
        amplitude: f64,
        offset: f64,
        period_s: f64,
        dt_s: f64,
    },
    Sine {
        amplitude: f64,
        offset: f64,
        period_s: f64,
        dt_s: f64,
    },
    /// Piecewise-constant `(tick, setpoint)` points, sorted by tick. Before
    /// the first point the first setpoint applies.
    Points(Vec<(u64, f64)>),
}

impl SetpointProfile {
    pub fn at(&self, tick: u64) -> f64 {
        match self {
            Self::Step { amplitude, offset } => offset + amplitude,
            Self::Square {
                amplitude,
                offset,
                period_s,
                dt_s,
            } => {
                let t = tick as f64 * dt_s;
                let phase = (t / period_s).fract();
                if phase < 0.5 {
                    offset + amplitude
                } else {
                    offset - amplitude
                }
            }
            Self::Sine {
                amplitude,
                offset,
                period_s,
                dt_s,
            } => {
                let t = tick as f64 * dt_s;
                offset + amplitude * (TAU * t / period_s).sin()
            }
            Self::Points(points) => {
                let idx = points.partition_point(|(t, _)| *t <= tick);
                match idx {
                    0 => points.first().map_or(0.0, |p| p.1),
                    i => points[i - 1].1,
                }
            }
        }
    }
}
