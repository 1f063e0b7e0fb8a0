//! filemeta-cli: command line front end and pre-commit hook.
//!
//! - `sources`: working-tree, git-index and revision-range change sources
//! - `commands`: the `check`, `hook`, `explain` and `fmt` operations
//! - `report`: text and JSON rendering of gate reports

pub mod commands;
pub mod report;
pub mod sources;

pub use commands::{Outcome, RunOptions};
pub use report::OutputFormat;
pub use sources::{GitIndexSource, GitRangeSource, WorkTreeSource};
