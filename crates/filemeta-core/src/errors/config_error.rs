//! Settings and policy-file I/O errors.

use super::error_code::{self, FilemetaErrorCode};

/// Errors from loading settings, reading policy files, or writing them back.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Settings parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid setting {field}: {message}")]
    InvalidSetting { field: String, message: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

impl FilemetaErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
