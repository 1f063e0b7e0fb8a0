//! Verification engine: first-match resolution and the sequential check run.

use std::fmt;

use serde::Serialize;

use super::matcher::{normalize_path, PatternMatcher};
use crate::checks::{AssertionSet, BoundCheck, CheckInvocation, CheckKind};
use crate::errors::PatternError;
use crate::policy::{CheckTable, PatternDescriptor};

/// The first check that failed for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub path: String,
    pub invocation: CheckInvocation,
    pub reason: String,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} failed: {}", self.path, self.invocation, self.reason)
    }
}

/// Result of running one file's check list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileVerification {
    pub path: String,
    /// The pattern that matched, `None` if the file has no obligations.
    pub pattern: Option<PatternDescriptor>,
    /// Checks that passed, in run order.
    pub checks_run: Vec<CheckKind>,
    pub failure: Option<CheckFailure>,
}

impl FileVerification {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn matched(&self) -> bool {
        self.pattern.is_some()
    }
}

/// Run `checks` in order. Check `i` sees assertions from checks `0..i` only;
/// the first failure ends the run.
pub fn run_checks(
    path: &str,
    checks: &[BoundCheck],
    content: &[u8],
) -> (Vec<CheckKind>, Option<CheckFailure>) {
    let mut asserted = AssertionSet::new();
    let mut passed = Vec::with_capacity(checks.len());

    for check in checks {
        if let Err(reason) = check.run(content, &asserted) {
            tracing::debug!(path, check = %check, reason = %reason, "check failed");
            let failure = CheckFailure {
                path: path.to_string(),
                invocation: check.invocation.clone(),
                reason,
            };
            return (passed, Some(failure));
        }
        asserted.record(check.kind(), check.args());
        passed.push(check.kind());
    }
    (passed, None)
}

#[derive(Debug, Clone)]
struct CompiledRule {
    descriptor: PatternDescriptor,
    matcher: PatternMatcher,
    checks: Vec<BoundCheck>,
}

/// A policy table with every pattern compiled. Read-only; safe to share
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct CompiledPolicy {
    rules: Vec<CompiledRule>,
}

impl CompiledPolicy {
    /// Compile every pattern. The first pattern that fails to compile is returned.
    pub fn compile(table: &CheckTable) -> Result<Self, PatternError> {
        let rules = table
            .iter()
            .map(|(descriptor, checks)| {
                Ok(CompiledRule {
                    descriptor: descriptor.clone(),
                    matcher: PatternMatcher::compile(descriptor)?,
                    checks: checks.clone(),
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;
        tracing::debug!(patterns = rules.len(), "policy compiled");
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first pattern, in declaration order, matching `path`.
    pub fn resolve(&self, path: &str) -> Option<(&PatternDescriptor, &[BoundCheck])> {
        let path = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(&path))
            .map(|rule| (&rule.descriptor, rule.checks.as_slice()))
    }

    pub fn verify(&self, path: &str, content: &[u8]) -> FileVerification {
        let Some((descriptor, checks)) = self.resolve(path) else {
            tracing::debug!(path, "no pattern matches");
            return FileVerification {
                path: path.to_string(),
                pattern: None,
                checks_run: Vec::new(),
                failure: None,
            };
        };

        tracing::debug!(path, pattern = %descriptor, checks = checks.len(), "verifying");
        let (checks_run, failure) = run_checks(path, checks, content);
        FileVerification {
            path: path.to_string(),
            pattern: Some(descriptor.clone()),
            checks_run,
            failure,
        }
    }
}
