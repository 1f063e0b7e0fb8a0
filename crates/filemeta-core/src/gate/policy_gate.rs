//! Policy gate: batch accept/reject over a change source.

use rayon::prelude::*;

use super::source::ChangeSource;
use super::types::{GateDecision, GateReport, RejectReason};
use crate::checks::CheckKind;
use crate::config::PolicySettings;
use crate::engine::{CompiledPolicy, FileVerification};
use crate::errors::GateError;
use crate::policy::{CheckTable, PolicyReader};
use crate::tracing::WarningSink;

/// Verifies every changed file and enforces the mandatory check names.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    policy: CompiledPolicy,
    mandatory: Vec<CheckKind>,
}

/// Outcome for one changed path.
struct PathOutcome {
    verification: Option<FileVerification>,
    reasons: Vec<RejectReason>,
}

impl PolicyGate {
    pub fn new(policy: CompiledPolicy, mandatory: impl IntoIterator<Item = CheckKind>) -> Self {
        let mut mandatory: Vec<CheckKind> = mandatory.into_iter().collect();
        mandatory.sort();
        mandatory.dedup();
        Self { policy, mandatory }
    }

    pub fn from_table(
        table: &CheckTable,
        mandatory: impl IntoIterator<Item = CheckKind>,
    ) -> Result<Self, GateError> {
        Ok(Self::new(CompiledPolicy::compile(table)?, mandatory))
    }

    pub fn policy(&self) -> &CompiledPolicy {
        &self.policy
    }

    pub fn mandatory(&self) -> &[CheckKind] {
        &self.mandatory
    }

    /// Verify `content` and compare the checks that ran with the mandatory set.
    /// Files no pattern matches are exempt.
    pub fn check_file(&self, path: &str, content: &[u8]) -> (FileVerification, Vec<RejectReason>) {
        let verification = self.policy.verify(path, content);
        let mut reasons = Vec::new();
        if let Some(failure) = &verification.failure {
            reasons.push(RejectReason::CheckFailed(failure.clone()));
        } else if verification.matched() {
            let missing: Vec<CheckKind> = self
                .mandatory
                .iter()
                .copied()
                .filter(|kind| !verification.checks_run.contains(kind))
                .collect();
            if !missing.is_empty() {
                reasons.push(RejectReason::MissingMandatory {
                    path: path.to_string(),
                    missing,
                });
            }
        }
        (verification, reasons)
    }

    fn check_path(&self, source: &dyn ChangeSource, path: &str) -> PathOutcome {
        match source.read_bytes(path) {
            Ok(content) => {
                let (verification, reasons) = self.check_file(path, &content);
                PathOutcome {
                    verification: Some(verification),
                    reasons,
                }
            }
            Err(e) => PathOutcome {
                verification: None,
                reasons: vec![RejectReason::Unreadable {
                    path: path.to_string(),
                    message: e.to_string(),
                }],
            },
        }
    }

    /// Check files in order and stop at the first rejected one.
    pub fn evaluate(&self, source: &dyn ChangeSource, warnings: &dyn WarningSink) -> GateReport {
        let paths = match source.changed_paths() {
            Ok(paths) => paths,
            Err(e) => return source_failure(e, warnings),
        };

        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            let outcome = self.check_path(source, path);
            files.extend(outcome.verification);
            if !outcome.reasons.is_empty() {
                return finish(files, outcome.reasons, warnings);
            }
        }
        finish(files, Vec::new(), warnings)
    }

    /// Check every file, in parallel, and report all rejections.
    pub fn evaluate_all(&self, source: &dyn ChangeSource, warnings: &dyn WarningSink) -> GateReport {
        let paths = match source.changed_paths() {
            Ok(paths) => paths,
            Err(e) => return source_failure(e, warnings),
        };

        let outcomes: Vec<PathOutcome> = paths
            .par_iter()
            .map(|path| self.check_path(source, path))
            .collect();

        let mut files = Vec::with_capacity(outcomes.len());
        let mut reasons = Vec::new();
        for outcome in outcomes {
            files.extend(outcome.verification);
            reasons.extend(outcome.reasons);
        }
        finish(files, reasons, warnings)
    }
}

fn source_failure(error: GateError, warnings: &dyn WarningSink) -> GateReport {
    let reason = RejectReason::Source {
        message: error.to_string(),
    };
    warnings.warn(&reason.to_string());
    GateReport::rejected(reason)
}

fn finish(
    files: Vec<FileVerification>,
    reasons: Vec<RejectReason>,
    warnings: &dyn WarningSink,
) -> GateReport {
    let decision = if reasons.is_empty() {
        tracing::info!(files = files.len(), "batch accepted");
        GateDecision::Accept {
            files_checked: files.len(),
        }
    } else {
        for reason in &reasons {
            warnings.warn(&reason.to_string());
        }
        tracing::info!(files = files.len(), rejections = reasons.len(), "batch rejected");
        GateDecision::Reject { reasons }
    };
    GateReport { decision, files }
}

/// Read the configured policy files through `source`, in order.
pub fn load_policy(
    source: &dyn ChangeSource,
    settings: &PolicySettings,
    warnings: &dyn WarningSink,
) -> Result<CheckTable, GateError> {
    let syntax = settings.effective_default_syntax()?;
    let mut reader = PolicyReader::new(warnings).with_default_syntax(syntax);
    let mut table = CheckTable::new();
    for file in settings.effective_pattern_files() {
        match source.policy_text(&file)? {
            Some(text) => reader.read_checks(&mut table, text.lines()),
            None => tracing::debug!(file = %file, "policy file not found, skipping"),
        }
    }
    Ok(table)
}

/// Compile `table` and run the gate over `source`. A policy that does not
/// compile rejects the batch.
pub fn gate_batch(
    table: &CheckTable,
    mandatory: &[CheckKind],
    source: &dyn ChangeSource,
    fail_fast: bool,
    warnings: &dyn WarningSink,
) -> GateReport {
    let gate = match PolicyGate::from_table(table, mandatory.iter().copied()) {
        Ok(gate) => gate,
        Err(e) => {
            let reason = RejectReason::InvalidPolicy {
                message: e.to_string(),
            };
            warnings.warn(&reason.to_string());
            return GateReport::rejected(reason);
        }
    };
    if fail_fast {
        gate.evaluate(source, warnings)
    } else {
        gate.evaluate_all(source, warnings)
    }
}
