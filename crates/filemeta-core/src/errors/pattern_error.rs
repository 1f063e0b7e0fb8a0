//! Pattern expression errors.

use super::error_code::{self, FilemetaErrorCode};

/// Errors raised while resolving or compiling a pattern expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The `<syntax>:` prefix (or `syntax:` value) is not a known keyword.
    #[error("invalid syntax \"{token}\"")]
    InvalidSyntax { token: String },

    #[error("invalid glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

impl FilemetaErrorCode for PatternError {
    fn error_code(&self) -> &'static str {
        error_code::PATTERN_ERROR
    }
}
