//! filemeta-core: per-file content policy engine
//!
//! This crate provides:
//! - Policy: the `syntax:` / `checks:` configuration language, reader and writer
//! - Checks: encoding, mimetype, bmp and bom validators over raw bytes
//! - Engine: first-match pattern resolution and the sequential check run
//! - Gate: batch accept/reject with mandatory checks over a host change source
//! - Config: layered `filemeta.toml` settings
//! - Tracing: subscriber setup and warning sinks

pub mod checks;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod policy;
pub mod tracing;

// Re-exports for convenience
pub use checks::{AssertionSet, BoundCheck, Check, CheckInvocation, CheckKind, CheckOutcome};
pub use config::{CliOverrides, FilemetaConfig};
pub use engine::{CheckFailure, CompiledPolicy, FileVerification};
pub use errors::{CheckError, ConfigError, FilemetaErrorCode, GateError, PatternError};
pub use gate::{
    gate_batch, load_policy, ChangeSource, GateDecision, GateReport, MemorySource, PolicyGate,
    RejectReason,
};
pub use policy::{
    read_policy, read_policy_files, read_policy_raw, render, CheckTable, PatternDescriptor,
    PolicyReader, PolicyTable, RawTable, SyntaxKind,
};
pub use tracing::{init_tracing, CollectedWarnings, TracingWarnings, WarningSink};
