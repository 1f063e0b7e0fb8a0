//! Check expression parser for the payload of `checks:` lines.
//!
//! Grammar: whitespace-separated `name(arg, arg, ...)` invocations. Bad
//! fragments are reported to the warning sink and dropped one by one; a line
//! with no invocation at all yields one warning for the whole line.

use std::sync::LazyLock;

use regex::Regex;

use crate::checks::{BoundCheck, CheckInvocation, CheckKind};
use crate::errors::CheckError;
use crate::tracing::WarningSink;

static INVOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([^(]+)\(([^)]*)\)\s*").expect("static regex is valid"));

/// One `name(args)` fragment exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment<'a> {
    name: &'a str,
    args: &'a str,
}

impl Fragment<'_> {
    fn source(&self) -> String {
        format!("{}({})", self.name, self.args)
    }

    /// Split on `,`, trim whitespace and surrounding quotes, drop empties.
    fn arguments(&self) -> Vec<String> {
        self.args
            .split(',')
            .map(|arg| arg.trim().trim_matches(|c| c == '\'' || c == '"'))
            .filter(|arg| !arg.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parses `checks:` payloads, reporting problems to a `WarningSink`.
pub struct CheckParser<'w> {
    warnings: &'w dyn WarningSink,
}

impl<'w> CheckParser<'w> {
    pub fn new(warnings: &'w dyn WarningSink) -> Self {
        Self { warnings }
    }

    fn report(&self, error: CheckError) {
        tracing::debug!(error = %error, "check expression rejected");
        self.warnings.warn(&error.to_string());
    }

    /// Known fragments with their kinds, unknown ones reported and skipped.
    fn fragments<'a>(&self, payload: &'a str) -> Vec<(CheckKind, Fragment<'a>)> {
        if payload.trim().is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut matched_any = false;
        for caps in INVOCATION_RE.captures_iter(payload) {
            matched_any = true;
            let (Some(name), Some(args)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let fragment = Fragment {
                name: name.as_str().trim(),
                args: args.as_str(),
            };
            match fragment.name.parse::<CheckKind>() {
                Ok(kind) => found.push((kind, fragment)),
                Err(e) => self.report(e),
            }
        }

        if !matched_any {
            self.report(CheckError::MalformedLine {
                line: payload.to_string(),
            });
        }
        found
    }

    /// Raw mode: the literal `name(args)` text of every known invocation,
    /// for editing and round-tripping.
    pub fn parse_raw(&self, payload: &str) -> Vec<String> {
        self.fragments(payload)
            .into_iter()
            .map(|(_, fragment)| fragment.source())
            .collect()
    }

    /// Unresolved invocations with their positional arguments.
    pub fn parse(&self, payload: &str) -> Vec<CheckInvocation> {
        self.fragments(payload)
            .into_iter()
            .map(|(kind, fragment)| CheckInvocation {
                kind,
                args: fragment.arguments(),
            })
            .collect()
    }

    /// Resolved mode: invocations bound to their validators. Invocations with
    /// the wrong number of arguments are reported and skipped.
    pub fn resolve(&self, payload: &str) -> Vec<BoundCheck> {
        self.parse(payload)
            .into_iter()
            .filter_map(|invocation| match invocation.bind() {
                Ok(bound) => Some(bound),
                Err(e) => {
                    self.report(e);
                    None
                }
            })
            .collect()
    }
}
