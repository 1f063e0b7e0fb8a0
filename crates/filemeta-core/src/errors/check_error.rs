//! Check expression errors.
//!
//! These never abort a read: the parser reports them as warnings and drops
//! only the offending fragment.

use super::error_code::{self, FilemetaErrorCode};

/// Errors found while parsing a `checks:` line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("ignoring malformed check line: {line}")]
    MalformedLine { line: String },

    #[error("ignoring unknown test function: {name}")]
    UnknownCheck { name: String },

    #[error("ignoring {name}: expected {expected} argument(s), found {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl FilemetaErrorCode for CheckError {
    fn error_code(&self) -> &'static str {
        error_code::CHECK_ERROR
    }
}
