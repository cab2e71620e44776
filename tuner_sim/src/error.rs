use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulated measurement timeout")]
    Timeout,
    #[error("simulated fault: {0}")]
    Fault(String),
    #[error("scripted source exhausted after {0} samples")]
    Exhausted(usize),
}
