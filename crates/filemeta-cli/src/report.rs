//! Rendering gate reports for people and for tools.

use std::fmt::Write as _;

use clap::ValueEnum;
use filemeta_core::gate::{GateDecision, GateReport};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render_report(report: &GateReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
    }
}

/// One line per file, then the decision.
pub fn render_text(report: &GateReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        let status = match (&file.failure, &file.pattern) {
            (Some(_), _) => "FAIL",
            (None, Some(_)) => "ok",
            (None, None) => "-",
        };
        let detail = match &file.pattern {
            Some(pattern) => pattern.key(),
            None => "no matching pattern".to_string(),
        };
        let _ = writeln!(out, "{status:<5}{}  ({detail})", file.path);
    }

    match &report.decision {
        GateDecision::Accept { files_checked } => {
            let _ = writeln!(out, "accepted: {files_checked} file(s) checked");
        }
        GateDecision::Reject { reasons } => {
            for reason in reasons {
                let _ = writeln!(out, "error: {reason}");
            }
            let _ = writeln!(out, "rejected: {} problem(s)", reasons.len());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use filemeta_core::checks::CheckKind;
    use filemeta_core::gate::MemorySource;
    use filemeta_core::policy::read_policy;
    use filemeta_core::tracing::CollectedWarnings;
    use filemeta_core::PolicyGate;

    fn report(content: &'static [u8]) -> GateReport {
        let sink = CollectedWarnings::new();
        let table = read_policy(["syntax: glob\nchecks: encoding(ascii)\n*.h\n"], &sink);
        let gate = PolicyGate::from_table(&table, Vec::<CheckKind>::new()).unwrap();
        let source = MemorySource::new()
            .with_file("a.h", content)
            .with_file("notes.txt", "x");
        gate.evaluate_all(&source, &sink)
    }

    #[test]
    fn test_text_report_accept() {
        let text = render_text(&report(b"int x;"));
        assert!(text.contains("ok   a.h  (relative-glob:*.h)"), "{text}");
        assert!(text.contains("-    notes.txt  (no matching pattern)"), "{text}");
        assert!(text.ends_with("accepted: 2 file(s) checked\n"), "{text}");
    }

    #[test]
    fn test_text_report_reject() {
        let text = render_text(&report(b"\xff"));
        assert!(text.contains("FAIL a.h"), "{text}");
        assert!(text.contains("error: a.h: encoding(ascii) failed:"), "{text}");
        assert!(text.ends_with("rejected: 1 problem(s)\n"), "{text}");
    }

    #[test]
    fn test_json_report_is_tagged() {
        let json = render_report(&report(b"\xff"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["decision"]["decision"], "reject");
        assert_eq!(value["decision"]["reasons"][0]["kind"], "check-failed");
        assert_eq!(value["files"][0]["path"], "a.h");
    }
}
