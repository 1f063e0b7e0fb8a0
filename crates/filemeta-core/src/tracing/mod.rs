//! Observability for filemeta.
//! `tracing` with an `EnvFilter`, plus the warning sink the policy reader and
//! gate report recovered problems through.

pub mod setup;
pub mod warnings;

pub use setup::init_tracing;
pub use warnings::{CollectedWarnings, TracingWarnings, WarningSink};
