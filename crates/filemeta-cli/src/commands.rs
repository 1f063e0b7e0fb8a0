//! The operations behind each subcommand. Each returns the text to print.

use std::path::{Path, PathBuf};

use anyhow::Context;
use filemeta_core::config::{CliOverrides, FilemetaConfig};
use filemeta_core::engine::{normalize_path, CompiledPolicy};
use filemeta_core::gate::{gate_batch, load_policy, ChangeSource};
use filemeta_core::policy::{render, write_policy_file, PolicyReader, RawTable};
use filemeta_core::tracing::WarningSink;
use serde_json::json;

use crate::report::{render_report, OutputFormat};
use crate::sources::{GitIndexSource, GitRangeSource, WorkTreeSource};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root: PathBuf,
    pub format: OutputFormat,
    pub overrides: CliOverrides,
}

/// Rendered output plus whether the batch was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub accepted: bool,
}

impl RunOptions {
    fn config(&self, root: &Path) -> anyhow::Result<FilemetaConfig> {
        FilemetaConfig::load(root, Some(&self.overrides))
            .with_context(|| format!("loading settings under {}", root.display()))
    }
}

/// Gate the given working-tree files.
pub fn check(
    opts: &RunOptions,
    paths: &[PathBuf],
    warnings: &dyn WarningSink,
) -> anyhow::Result<Outcome> {
    let source = WorkTreeSource::new(&opts.root, paths);
    run_gate(opts, &opts.root, &source, warnings)
}

/// Gate the files staged in the git index of the repository containing `root`,
/// or with `range`, every file touched by `<old>..<new>` as it is at `<new>`.
pub fn hook(
    opts: &RunOptions,
    range: Option<&str>,
    warnings: &dyn WarningSink,
) -> anyhow::Result<Outcome> {
    match range {
        Some(range) => {
            let source = GitRangeSource::discover(&opts.root, range)
                .with_context(|| format!("listing revisions {range}"))?;
            let root = source.workdir().to_path_buf();
            run_gate(opts, &root, &source, warnings)
        }
        None => {
            let source =
                GitIndexSource::discover(&opts.root).context("opening git repository")?;
            let root = source.workdir().to_path_buf();
            run_gate(opts, &root, &source, warnings)
        }
    }
}

fn run_gate(
    opts: &RunOptions,
    root: &Path,
    source: &dyn ChangeSource,
    warnings: &dyn WarningSink,
) -> anyhow::Result<Outcome> {
    let config = opts.config(root)?;
    let mandatory = config.gate.mandatory_kinds()?;
    let table = load_policy(source, &config.policy, warnings).context("loading policy")?;
    let report = gate_batch(
        &table,
        &mandatory,
        source,
        config.gate.effective_fail_fast(),
        warnings,
    );
    Ok(Outcome {
        output: render_report(&report, opts.format)?,
        accepted: report.is_accept(),
    })
}

/// Show which pattern governs `path` and the checks it would run.
pub fn explain(
    opts: &RunOptions,
    path: &Path,
    warnings: &dyn WarningSink,
) -> anyhow::Result<String> {
    let config = opts.config(&opts.root)?;
    let source = WorkTreeSource::new(&opts.root, &[]);
    let table = load_policy(&source, &config.policy, warnings).context("loading policy")?;
    let policy = CompiledPolicy::compile(&table).context("compiling policy")?;

    let relative = path.strip_prefix(&opts.root).unwrap_or(path);
    let path = normalize_path(&relative.to_string_lossy());
    let resolved = policy.resolve(&path);

    match opts.format {
        OutputFormat::Json => {
            let value = match resolved {
                Some((pattern, checks)) => json!({
                    "path": path,
                    "pattern": pattern,
                    "checks": checks.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
                None => json!({ "path": path, "pattern": null, "checks": [] }),
            };
            Ok(serde_json::to_string_pretty(&value)? + "\n")
        }
        OutputFormat::Text => Ok(match resolved {
            Some((pattern, checks)) if checks.is_empty() => {
                format!("{path}: {}\n  no checks\n", pattern.key())
            }
            Some((pattern, checks)) => {
                let checks: Vec<String> = checks.iter().map(ToString::to_string).collect();
                format!("{path}: {}\n  checks: {}\n", pattern.key(), checks.join(" "))
            }
            None => format!("{path}: no matching pattern\n"),
        }),
    }
}

/// Merge the configured policy files into one normalized text. With `write`,
/// the result replaces the first policy file.
pub fn fmt(opts: &RunOptions, write: bool, warnings: &dyn WarningSink) -> anyhow::Result<String> {
    let config = opts.config(&opts.root)?;
    let syntax = config.policy.effective_default_syntax()?;
    let files = config.policy.effective_pattern_files();
    let source = WorkTreeSource::new(&opts.root, &[]);

    let mut reader = PolicyReader::new(warnings).with_default_syntax(syntax);
    let mut table = RawTable::new();
    for file in &files {
        if let Some(text) = source.policy_text(file)? {
            reader.read_raw(&mut table, text.lines());
        }
    }

    if write {
        let target = files.first().context("no policy file configured")?;
        write_policy_file(&opts.root.join(target), &table)?;
        tracing::info!(file = %target, patterns = table.len(), "policy rewritten");
    }
    Ok(render(&table))
}
