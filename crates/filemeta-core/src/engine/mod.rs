//! Verification engine: compiled path matchers and the per-file check run.

pub mod matcher;
pub mod verifier;

pub use matcher::{normalize_path, PatternMatcher};
pub use verifier::{run_checks, CheckFailure, CompiledPolicy, FileVerification};
