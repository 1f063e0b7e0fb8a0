//! The policy language: pattern expressions, `checks:` expressions, and the
//! line-oriented reader and writer that build and render a `PolicyTable`.

pub mod checks_parser;
pub mod reader;
pub mod syntax;
pub mod table;
pub mod writer;

pub use checks_parser::CheckParser;
pub use reader::{read_policy, read_policy_files, read_policy_raw, strip_comment, PolicyReader};
pub use syntax::{resolve_pattern, PatternDescriptor, SyntaxKind};
pub use table::{CheckTable, PolicyTable, RawTable};
pub use writer::{render, to_raw, write_policy_file};
