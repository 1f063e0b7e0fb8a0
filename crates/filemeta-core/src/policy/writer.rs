//! Render a policy table back into the configuration language.
//!
//! The output reads back (through [`super::reader`]) into an equal table for
//! any pattern that contains no `\#` sequence and no trailing whitespace.

use std::path::Path;

use super::syntax::{split_syntax_prefix, PatternDescriptor, SyntaxKind};
use super::table::{CheckTable, RawTable};
use crate::constants::{CHECKS_DIRECTIVE, SYNTAX_DIRECTIVE};
use crate::errors::ConfigError;

fn escape(text: &str) -> String {
    text.replace('#', "\\#")
}

/// Most frequent syntax in the table; ties go to the one declared first.
fn dominant_syntax(table: &RawTable) -> SyntaxKind {
    let mut counts: Vec<(SyntaxKind, usize)> = Vec::new();
    for descriptor in table.descriptors() {
        match counts.iter_mut().find(|(kind, _)| *kind == descriptor.syntax) {
            Some((_, n)) => *n += 1,
            None => counts.push((descriptor.syntax, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(SyntaxKind, usize)>, (kind, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((kind, n)),
        })
        .map(|(kind, _)| kind)
        .unwrap_or_default()
}

fn pattern_line(descriptor: &PatternDescriptor, default: SyntaxKind) -> String {
    let pattern = &descriptor.pattern;
    let bare = descriptor.syntax == default
        && !pattern.is_empty()
        && split_syntax_prefix(pattern).is_none();
    if bare {
        escape(pattern)
    } else {
        format!("{}:{}", descriptor.syntax.alias(), escape(pattern))
    }
}

/// Serialize `table` as policy text.
pub fn render(table: &RawTable) -> String {
    let mut out = String::new();
    if table.is_empty() {
        return out;
    }

    let default = dominant_syntax(table);
    out.push_str(&format!("{SYNTAX_DIRECTIVE} {}\n", default.alias()));

    let mut current: &[String] = &[];
    for (descriptor, checks) in table.iter() {
        if checks.as_slice() != current {
            if checks.is_empty() {
                out.push_str(CHECKS_DIRECTIVE);
            } else {
                out.push_str(&format!("{CHECKS_DIRECTIVE} {}", escape(&checks.join(" "))));
            }
            out.push('\n');
            current = checks;
        }
        out.push_str(&pattern_line(descriptor, default));
        out.push('\n');
    }
    out
}

/// Raw view of a resolved table, each check in its `name(args)` form.
pub fn to_raw(table: &CheckTable) -> RawTable {
    table
        .iter()
        .map(|(descriptor, checks)| {
            (
                descriptor.clone(),
                checks.iter().map(ToString::to_string).collect(),
            )
        })
        .collect()
}

/// Render `table` and write it to `path`.
pub fn write_policy_file(path: &Path, table: &RawTable) -> Result<(), ConfigError> {
    std::fs::write(path, render(table)).map_err(|e| ConfigError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
