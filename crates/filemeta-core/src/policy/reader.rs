//! Policy file reader: `syntax:` and `checks:` directives and pattern lines.
//!
//! Line rules:
//! - everything after an unescaped `#` is a comment; `\#` is a literal `#`
//! - `syntax: <kind>` changes the default syntax for the following lines
//! - `checks: <invocations>` sets the check list attached to following patterns
//! - any other non-blank line is a pattern

use std::io::ErrorKind;
use std::path::Path;

use super::checks_parser::CheckParser;
use super::syntax::{resolve_pattern, SyntaxKind};
use super::table::{CheckTable, PolicyTable, RawTable};
use crate::constants::{CHECKS_DIRECTIVE, SYNTAX_DIRECTIVE};
use crate::errors::ConfigError;
use crate::tracing::WarningSink;

/// Remove a trailing comment, unescape `\#`, strip trailing whitespace.
///
/// A `#` starts a comment when it is preceded by an even number of
/// consecutive backslashes (zero included).
pub fn strip_comment(line: &str) -> String {
    let mut backslashes = 0usize;
    let mut cut = line.len();
    for (i, c) in line.char_indices() {
        match c {
            '\\' => backslashes += 1,
            '#' if backslashes % 2 == 0 => {
                cut = i;
                break;
            }
            _ => backslashes = 0,
        }
    }
    line[..cut].replace("\\#", "#").trim_end().to_string()
}

/// Stateful reader. The default syntax carries over from one source to the
/// next; the pending check list starts empty for every source.
pub struct PolicyReader<'w> {
    warnings: &'w dyn WarningSink,
    syntax: SyntaxKind,
}

impl<'w> PolicyReader<'w> {
    pub fn new(warnings: &'w dyn WarningSink) -> Self {
        Self {
            warnings,
            syntax: SyntaxKind::default(),
        }
    }

    /// Start from a different default syntax than `relative-regex`.
    pub fn with_default_syntax(mut self, syntax: SyntaxKind) -> Self {
        self.syntax = syntax;
        self
    }

    /// The default syntax currently in effect.
    pub fn syntax(&self) -> SyntaxKind {
        self.syntax
    }

    /// Read one source into `table`, decoding each `checks:` payload with `decode`.
    pub fn read_into<T, I, S, F>(&mut self, table: &mut PolicyTable<T>, lines: I, mut decode: F)
    where
        T: Clone + Default,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&CheckParser<'w>, &str) -> T,
    {
        let parser = CheckParser::new(self.warnings);
        let mut pending = T::default();

        for raw in lines {
            let line = strip_comment(raw.as_ref());
            if line.is_empty() {
                continue;
            }

            if let Some(value) = line.strip_prefix(SYNTAX_DIRECTIVE) {
                match SyntaxKind::from_keyword(value.trim()) {
                    Ok(syntax) => {
                        tracing::debug!(syntax = %syntax, "default syntax changed");
                        self.syntax = syntax;
                    }
                    Err(_) => self
                        .warnings
                        .warn(&format!("ignoring invalid syntax: '{}'", value.trim())),
                }
            } else if let Some(payload) = line.strip_prefix(CHECKS_DIRECTIVE) {
                pending = decode(&parser, payload);
            } else {
                match resolve_pattern(&line, self.syntax) {
                    Ok(descriptor) => {
                        tracing::debug!(pattern = %descriptor, "pattern declared");
                        table.insert(descriptor, pending.clone());
                    }
                    Err(e) => self.warnings.warn(&format!("ignoring pattern '{line}': {e}")),
                }
            }
        }
    }

    /// Read one source, resolving checks to validators.
    pub fn read_checks<I, S>(&mut self, table: &mut CheckTable, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read_into(table, lines, |parser, payload| parser.resolve(payload));
    }

    /// Read one source, keeping the literal check fragments.
    pub fn read_raw<I, S>(&mut self, table: &mut RawTable, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read_into(table, lines, |parser, payload| parser.parse_raw(payload));
    }
}

/// Build a resolved table from in-memory sources, later sources overriding
/// earlier ones pattern by pattern.
pub fn read_policy<'a, I>(sources: I, warnings: &dyn WarningSink) -> CheckTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut reader = PolicyReader::new(warnings);
    let mut table = CheckTable::new();
    for text in sources {
        reader.read_checks(&mut table, text.lines());
    }
    table
}

/// Like [`read_policy`] but keeps the literal check text (editor mode).
pub fn read_policy_raw<'a, I>(sources: I, warnings: &dyn WarningSink) -> RawTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut reader = PolicyReader::new(warnings);
    let mut table = RawTable::new();
    for text in sources {
        reader.read_raw(&mut table, text.lines());
    }
    table
}

/// Read policy files in order. Files that do not exist are skipped.
pub fn read_policy_files<P: AsRef<Path>>(
    paths: &[P],
    default_syntax: SyntaxKind,
    warnings: &dyn WarningSink,
) -> Result<CheckTable, ConfigError> {
    let mut reader = PolicyReader::new(warnings).with_default_syntax(default_syntax);
    let mut table = CheckTable::new();
    for path in paths {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "policy file not found, skipping");
                continue;
            }
            Err(e) => {
                return Err(ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        reader.read_checks(&mut table, text.lines());
    }
    Ok(table)
}
