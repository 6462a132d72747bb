use thiserror::Error;

/// Configuration errors raised by the engines.
///
/// Insufficient data is not an error: the indicator engine returns `None` and
/// the spectral engine returns a degenerate zero-energy result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("window length mismatch: expected {expected} samples, got {actual}")]
    WindowLengthMismatch { expected: usize, actual: usize },

    #[error("projection needs one phase per frequency: {frequencies} frequencies, {phases} phases")]
    ProjectionLengthMismatch { frequencies: usize, phases: usize },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
