use thiserror::Error;

/// Runtime failures of the loop that drives a `Tuner`.
///
/// The tuner itself is total; these come from its collaborators.
#[derive(Debug, Error, Clone)]
pub enum TunerError {
    #[error("measurement source error: {0}")]
    Source(String),
    #[error("gain sink error: {0}")]
    Sink(String),
    #[error("timeout waiting for measurement")]
    Timeout,
    #[error("run interrupted")]
    Interrupted,
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sample period (dt)")]
    MissingDt,
    #[error("missing initial gains")]
    MissingGains,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
