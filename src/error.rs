use std::fmt::{self, Debug, Display};

/// Provides `ModelError`, the error type raised when a model configuration
/// cannot be evaluated.
///
/// The engine never retries: it is pure and deterministic, so a failed
/// construction or evaluation always means the caller must fix the input.
/// Messages are written to be surfaced directly to an end user by the
/// configuration layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Window or opening geometry that cannot produce a physical flow.
    InvalidGeometry(String),
    /// Mutually incompatible Monte-Carlo axes or sample counts.
    Vectorisation(String),
    /// Any other inconsistent model configuration.
    Configuration(String),
}

impl From<String> for ModelError {
    fn from(error: String) -> Self {
        ModelError::Configuration(error)
    }
}

impl From<&str> for ModelError {
    fn from(error: &str) -> Self {
        ModelError::Configuration(error.to_string())
    }
}

impl std::error::Error for ModelError {}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::InvalidGeometry(msg)
            | ModelError::Vectorisation(msg)
            | ModelError::Configuration(msg) => write!(f, "{msg}"),
        }
    }
}
