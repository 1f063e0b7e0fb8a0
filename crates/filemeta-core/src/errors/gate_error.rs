//! Policy gate errors.

use super::error_code::{self, FilemetaErrorCode};
use super::{ConfigError, PatternError};

/// Errors that can occur while the gate talks to its host or prepares
/// the policy. The gate turns each of these into a rejection.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Change source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Policy pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Policy settings error: {0}")]
    Config(#[from] ConfigError),
}

impl FilemetaErrorCode for GateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) | Self::ReadFailed { .. } => error_code::GATE_ERROR,
            Self::Pattern(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
