//! Time helpers for pacing ticks.

use std::time::Duration;

/// Smallest tick period the runner will pace at.
pub const MIN_PERIOD: Duration = Duration::from_micros(1);

/// Convert a sample period in seconds to a `Duration`.
/// Non-finite, non-positive or tiny values map to `MIN_PERIOD`.
#[inline]
pub fn period_from_dt(dt_s: f64) -> Duration {
    Duration::try_from_secs_f64(dt_s)
        .unwrap_or(MIN_PERIOD)
        .max(MIN_PERIOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_seconds() {
        assert_eq!(period_from_dt(0.1), Duration::from_millis(100));
        assert_eq!(period_from_dt(2.0), Duration::from_secs(2));
    }

    #[test]
    fn degenerate_inputs_floor_to_min_period() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-12] {
            assert_eq!(period_from_dt(dt), MIN_PERIOD);
        }
    }
}
