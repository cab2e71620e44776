//! Maps `Box<dyn Error>` from the collaborator traits to a typed `TunerError`.
//!
//! With the `sim-errors` feature, `tuner_sim::SimError` is downcast for an
//! exact mapping; anything else falls back to inspecting the message.

use crate::error::TunerError;

/// Which side of the loop raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Sink,
}

pub fn map_collaborator_error(side: Side, e: &(dyn std::error::Error + 'static)) -> TunerError {
    #[cfg(feature = "sim-errors")]
    {
        if let Some(sim) = e.downcast_ref::<tuner_sim::SimError>() {
            return match sim {
                tuner_sim::SimError::Timeout => TunerError::Timeout,
                other => wrap(side, other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        TunerError::Timeout
    } else {
        wrap(side, s)
    }
}

fn wrap(side: Side, msg: String) -> TunerError {
    match side {
        Side::Source => TunerError::Source(msg),
        Side::Sink => TunerError::Sink(msg),
    }
}
