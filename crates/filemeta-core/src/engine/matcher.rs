//! Path matchers compiled from pattern descriptors.
//!
//! Paths are repository-relative with `/` separators (see [`normalize_path`]).

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::errors::PatternError;
use crate::policy::{PatternDescriptor, SyntaxKind};

/// A compiled "does this pattern match this path" predicate.
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// Matches every path. Used for empty patterns.
    Always,
    Glob(GlobSet),
    Regex(Regex),
    /// Exact path or directory prefix.
    Prefix(String),
}

impl PatternMatcher {
    pub fn compile(descriptor: &PatternDescriptor) -> Result<Self, PatternError> {
        let pattern = descriptor.pattern.as_str();
        match descriptor.syntax {
            SyntaxKind::RelativeRegex => Regex::new(pattern)
                .map(PatternMatcher::Regex)
                .map_err(|e| PatternError::InvalidRegex {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                }),
            SyntaxKind::Path => {
                let prefix = pattern.trim_end_matches('/');
                if prefix.is_empty() || prefix == "." {
                    Ok(PatternMatcher::Always)
                } else {
                    Ok(PatternMatcher::Prefix(prefix.to_string()))
                }
            }
            _ if pattern.is_empty() => Ok(PatternMatcher::Always),
            SyntaxKind::RelativeGlob => {
                compile_globs(pattern, &[format!("**/{pattern}"), format!("**/{pattern}/**")])
            }
            SyntaxKind::RootGlob => {
                compile_globs(pattern, &[pattern.to_string(), format!("{pattern}/**")])
            }
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            PatternMatcher::Always => true,
            PatternMatcher::Glob(set) => set.is_match(path),
            PatternMatcher::Regex(re) => re.is_match(path),
            PatternMatcher::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// `*` and `?` never cross a `/`; `**` spans directories.
fn compile_globs(pattern: &str, globs: &[String]) -> Result<PatternMatcher, PatternError> {
    let invalid = |e: globset::Error| PatternError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    };
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(
            GlobBuilder::new(glob)
                .literal_separator(true)
                .build()
                .map_err(invalid)?,
        );
    }
    builder.build().map(PatternMatcher::Glob).map_err(invalid)
}

/// Repository-relative form: `/` separators, no leading `./` or `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}
