//! Gate decisions and rejection reasons.

use std::fmt;

use serde::Serialize;

use crate::checks::CheckKind;
use crate::engine::{CheckFailure, FileVerification};

/// Why a batch was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RejectReason {
    CheckFailed(CheckFailure),
    MissingMandatory { path: String, missing: Vec<CheckKind> },
    Unreadable { path: String, message: String },
    /// The host could not list the batch.
    Source { message: String },
    /// A policy pattern failed to compile.
    InvalidPolicy { message: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::CheckFailed(failure) => failure.fmt(f),
            RejectReason::MissingMandatory { path, missing } => {
                let names: Vec<&str> = missing.iter().map(CheckKind::name).collect();
                write!(f, "{path}: mandatory checks not run: {}", names.join(", "))
            }
            RejectReason::Unreadable { path, message } => write!(f, "{path}: unreadable: {message}"),
            RejectReason::Source { message } => write!(f, "change list unavailable: {message}"),
            RejectReason::InvalidPolicy { message } => write!(f, "invalid policy: {message}"),
        }
    }
}

/// Outcome for the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum GateDecision {
    Accept { files_checked: usize },
    Reject { reasons: Vec<RejectReason> },
}

impl GateDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept { .. })
    }

    pub fn reasons(&self) -> &[RejectReason] {
        match self {
            GateDecision::Accept { .. } => &[],
            GateDecision::Reject { reasons } => reasons,
        }
    }
}

/// Decision plus the per-file verifications that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub decision: GateDecision,
    pub files: Vec<FileVerification>,
}

impl GateReport {
    pub(crate) fn rejected(reason: RejectReason) -> Self {
        Self {
            decision: GateDecision::Reject {
                reasons: vec![reason],
            },
            files: Vec::new(),
        }
    }

    pub fn is_accept(&self) -> bool {
        self.decision.is_accept()
    }
}
