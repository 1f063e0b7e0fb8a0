//! Pattern syntaxes and `[<syntax>:]<pattern>` resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PatternError;

/// How a pattern's text is interpreted when matched against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    /// Glob matched at any directory depth (`glob`, `relglob`).
    RelativeGlob,
    /// Regular expression searched anywhere in the path (`re`, `regexp`, `relre`).
    #[default]
    RelativeRegex,
    /// Exact root-relative path or directory prefix.
    Path,
    /// Glob anchored at the repository root.
    #[serde(rename = "rootglob")]
    RootGlob,
}

impl SyntaxKind {
    pub const ALL: [SyntaxKind; 4] = [
        SyntaxKind::RelativeGlob,
        SyntaxKind::RelativeRegex,
        SyntaxKind::Path,
        SyntaxKind::RootGlob,
    ];

    /// Canonical keyword, used in descriptor keys.
    pub fn keyword(&self) -> &'static str {
        match self {
            SyntaxKind::RelativeGlob => "relative-glob",
            SyntaxKind::RelativeRegex => "relative-regex",
            SyntaxKind::Path => "path",
            SyntaxKind::RootGlob => "rootglob",
        }
    }

    /// Short user-facing spelling, valid both as a line prefix and as a
    /// `syntax:` value.
    pub fn alias(&self) -> &'static str {
        match self {
            SyntaxKind::RelativeGlob => "glob",
            SyntaxKind::RelativeRegex => "re",
            SyntaxKind::Path => "path",
            SyntaxKind::RootGlob => "rootglob",
        }
    }

    /// Resolve a user alias or canonical keyword.
    pub fn from_keyword(token: &str) -> Result<Self, PatternError> {
        match token {
            "glob" | "relglob" | "relative-glob" => Ok(SyntaxKind::RelativeGlob),
            "re" | "regexp" | "relre" | "relative-regex" => Ok(SyntaxKind::RelativeRegex),
            "path" => Ok(SyntaxKind::Path),
            "rootglob" => Ok(SyntaxKind::RootGlob),
            _ => Err(PatternError::InvalidSyntax {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for SyntaxKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s.trim())
    }
}

/// Canonical `(syntax, pattern)` pair. Its `Display` form
/// `<keyword>:<pattern>` is the policy table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternDescriptor {
    pub syntax: SyntaxKind,
    pub pattern: String,
}

impl PatternDescriptor {
    pub fn new(syntax: SyntaxKind, pattern: impl Into<String>) -> Self {
        Self {
            syntax,
            pattern: pattern.into(),
        }
    }

    /// The unique lookup key, `<keyword>:<pattern>`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PatternDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.syntax.keyword(), self.pattern)
    }
}

/// Split a leading `<alnum>:` prefix off `line`.
///
/// Only an ASCII alphanumeric run at the very start of the line counts, so a
/// colon inside e.g. `dir/[a-z:]*.cpp` is left alone.
pub fn split_syntax_prefix(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let token = &line[..colon];
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some((token, &line[colon + 1..]))
}

/// Resolve one pattern line against the ambient default syntax.
pub fn resolve_pattern(line: &str, default: SyntaxKind) -> Result<PatternDescriptor, PatternError> {
    match split_syntax_prefix(line) {
        None => Ok(PatternDescriptor::new(default, line)),
        Some((token, rest)) => {
            let syntax = SyntaxKind::from_keyword(token)?;
            Ok(PatternDescriptor::new(syntax, rest))
        }
    }
}
