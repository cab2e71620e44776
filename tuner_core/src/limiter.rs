//! Gain bounds and clamping.

/// A PID gain triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// Clamp `value` into `[min, max]`, returning the nearer bound when outside.
///
/// Unlike `f64::clamp` this never panics: callers keep `min <= max` via
/// `GainBounds::new`, and a NaN bound is ignored.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Inclusive `[min, max]` range for one gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainBounds {
    min: f64,
    max: f64,
}

impl GainBounds {
    /// Build a range; bounds given in the wrong order are swapped.
    pub fn new(min: f64, max: f64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        clamp(value, self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Independent bounds for Kp, Ki and Kd.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainLimits {
    pub kp: GainBounds,
    pub ki: GainBounds,
    pub kd: GainBounds,
}

impl Default for GainLimits {
    fn default() -> Self {
        Self {
            kp: GainBounds::new(0.0, 100.0),
            ki: GainBounds::new(0.0, 100.0),
            kd: GainBounds::new(0.0, 100.0),
        }
    }
}

impl GainLimits {
    pub fn new(
        min_kp: f64,
        max_kp: f64,
        min_ki: f64,
        max_ki: f64,
        min_kd: f64,
        max_kd: f64,
    ) -> Self {
        Self {
            kp: GainBounds::new(min_kp, max_kp),
            ki: GainBounds::new(min_ki, max_ki),
            kd: GainBounds::new(min_kd, max_kd),
        }
    }

    /// Clamp each gain into its own range.
    pub fn apply(&self, gains: Gains) -> Gains {
        Gains {
            kp: self.kp.clamp(gains.kp),
            ki: self.ki.clamp(gains.ki),
            kd: self.kd.clamp(gains.kd),
        }
    }

    pub fn contains(&self, gains: &Gains) -> bool {
        self.kp.contains(gains.kp) && self.ki.contains(gains.ki) && self.kd.contains(gains.kd)
    }
}
