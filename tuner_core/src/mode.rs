//! Tuning state machine.

use std::fmt;

/// Whether adaptation is requested and, if so, whether it may run.
///
/// ```text
///            start                  enough fresh samples
///   Idle ───────────► Gathering ─────────────────────────► Active
///    ▲                    ▲                                  │
///    │ stop (any state)   └──────────── reset ───────────────┘
/// ```
///
/// `stop` always returns to `Idle` and discards sufficiency, so the next
/// `Active` phase needs a full fresh accumulation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningMode {
    /// Tuning not requested; samples are still recorded.
    #[default]
    Idle,
    /// Tuning requested, waiting for `min_data_for_tuning` samples.
    Gathering,
    /// Tuning requested and the window is sufficient; rules run every tick.
    Active,
}

impl TuningMode {
    pub fn is_requested(self) -> bool {
        !matches!(self, TuningMode::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TuningMode::Idle => "idle",
            TuningMode::Gathering => "gathering",
            TuningMode::Active => "active",
        }
    }
}

impl fmt::Display for TuningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
