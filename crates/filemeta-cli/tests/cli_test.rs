//! Tests for the change sources, the subcommands and the binary.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use filemeta_cli::commands;
use filemeta_cli::{GitIndexSource, GitRangeSource, OutputFormat, RunOptions, WorkTreeSource};
use filemeta_core::config::CliOverrides;
use filemeta_core::gate::ChangeSource;
use filemeta_core::tracing::CollectedWarnings;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

/// Serializes tests that resolve settings from the environment.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const POLICY: &str = "\
syntax: glob
checks: encoding(ascii) mimetype(text/plain)
*.h
checks: bom(false)
*.md
";

const ENV_VARS: [&str; 4] = [
    "FILEMETA_PATTERN_FILES",
    "FILEMETA_DEFAULT_SYNTAX",
    "FILEMETA_MANDATORY",
    "FILEMETA_FAIL_FAST",
];

fn write(root: &Path, path: &str, content: &[u8]) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".filemeta", POLICY.as_bytes());
    write(dir.path(), "foo.h", b"int x;\n");
    write(dir.path(), "bar.h", b"int x;\x80\n");
    write(dir.path(), "README.md", b"# readme\n");
    dir
}

/// Runs `f` with a clean settings environment and an empty home directory.
fn with_clean_env<T>(f: impl FnOnce() -> T) -> T {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let home = TempDir::new().unwrap();
    let previous = std::env::var_os("HOME");
    for key in ENV_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home.path());
    let result = f();
    match previous {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    result
}

fn options(root: &Path) -> RunOptions {
    RunOptions {
        root: root.to_path_buf(),
        format: OutputFormat::Text,
        overrides: CliOverrides::default(),
    }
}

// ---- work tree source ----

#[test]
fn test_work_tree_source_relativizes_paths() {
    let dir = project();
    let source = WorkTreeSource::new(
        dir.path(),
        &[dir.path().join("foo.h"), PathBuf::from("./README.md")],
    );
    assert_eq!(source.changed_paths().unwrap(), vec!["foo.h", "README.md"]);
    assert_eq!(source.read_bytes("foo.h").unwrap(), b"int x;\n");
}

#[test]
fn test_work_tree_source_missing_files() {
    let dir = project();
    let source = WorkTreeSource::new(dir.path(), &[]);
    assert!(source.read_bytes("nope.h").is_err());
    assert_eq!(source.policy_text("absent.filemeta").unwrap(), None);
    assert!(source.policy_text(".filemeta").unwrap().unwrap().contains("*.h"));
}

// ---- git index source ----

fn stage(repo: &Repository, paths: &[&str]) {
    let mut index = repo.index().unwrap();
    for path in paths {
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
}

fn commit_index(repo: &Repository) -> Oid {
    let signature = Signature::now("filemeta", "filemeta@example.com").unwrap();
    let mut index = repo.index().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, "change", &tree, &parents)
        .unwrap()
}

#[test]
fn test_git_source_on_unborn_branch_lists_staged_files() {
    let dir = project();
    let repo = Repository::init(dir.path()).unwrap();
    stage(&repo, &[".filemeta", "foo.h"]);

    let source = GitIndexSource::discover(dir.path()).unwrap();
    assert_eq!(source.changed_paths().unwrap(), vec![".filemeta", "foo.h"]);
    assert_eq!(source.read_bytes("foo.h").unwrap(), b"int x;\n");
    // unstaged files are invisible
    assert!(source.read_bytes("bar.h").is_err());
    assert_eq!(source.policy_text("absent.filemeta").unwrap(), None);
}

#[test]
fn test_git_source_reads_staged_content_not_work_tree() {
    let dir = project();
    let repo = Repository::init(dir.path()).unwrap();
    stage(&repo, &[".filemeta", "foo.h", "README.md"]);
    commit_index(&repo);

    write(dir.path(), "foo.h", b"int y;\n");
    stage(&repo, &["foo.h"]);
    write(dir.path(), "foo.h", b"\xff unstaged\n");

    let source = GitIndexSource::discover(dir.path()).unwrap();
    assert_eq!(source.changed_paths().unwrap(), vec!["foo.h"]);
    assert_eq!(source.read_bytes("foo.h").unwrap(), b"int y;\n");
    assert!(source.policy_text(".filemeta").unwrap().is_some());
}

#[test]
fn test_git_source_skips_deletions() {
    let dir = project();
    let repo = Repository::init(dir.path()).unwrap();
    stage(&repo, &[".filemeta", "foo.h", "README.md"]);
    commit_index(&repo);

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new("README.md")).unwrap();
    index.write().unwrap();

    let source = GitIndexSource::discover(dir.path()).unwrap();
    assert!(source.changed_paths().unwrap().is_empty());
}

#[test]
fn test_git_source_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    // an isolated directory may still sit inside a checkout on some machines
    if Repository::discover(dir.path()).is_ok() {
        return;
    }
    assert!(GitIndexSource::discover(dir.path()).is_err());
}

// ---- revision range source ----

/// Three commits: the base, one adding a bad header and touching foo.h,
/// one adding and then a later one removing a scratch file.
fn history(dir: &Path) -> (Repository, Oid, Oid) {
    let repo = Repository::init(dir).unwrap();
    stage(&repo, &[".filemeta", "foo.h", "README.md"]);
    let base = commit_index(&repo);

    write(dir, "foo.h", b"int y;\n");
    write(dir, "scratch.md", b"tmp\n");
    stage(&repo, &["foo.h", "bar.h", "scratch.md"]);
    commit_index(&repo);

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new("scratch.md")).unwrap();
    index.write().unwrap();
    let tip = commit_index(&repo);
    (repo, base, tip)
}

#[test]
fn test_range_source_lists_files_touched_and_present_at_tip() {
    let dir = project();
    let (_repo, base, tip) = history(dir.path());

    let source = GitRangeSource::discover(dir.path(), &format!("{base}..{tip}")).unwrap();
    assert_eq!(source.changed_paths().unwrap(), vec!["bar.h", "foo.h"]);

    // content comes from the tip commit, not the working tree
    write(dir.path(), "foo.h", b"\xff edited\n");
    assert_eq!(source.read_bytes("foo.h").unwrap(), b"int y;\n");
    assert!(source.read_bytes("scratch.md").is_err());
    assert!(source.policy_text(".filemeta").unwrap().unwrap().contains("*.h"));
    assert_eq!(source.policy_text("absent.filemeta").unwrap(), None);
}

#[test]
fn test_range_source_requires_a_range() {
    let dir = project();
    let (_repo, _base, tip) = history(dir.path());
    assert!(GitRangeSource::discover(dir.path(), &tip.to_string()).is_err());
}

// ---- commands ----

#[test]
fn test_check_command_accepts_clean_files() {
    let dir = project();
    let sink = CollectedWarnings::new();
    let outcome = with_clean_env(|| {
        commands::check(
            &options(dir.path()),
            &[PathBuf::from("foo.h"), PathBuf::from("README.md")],
            &sink,
        )
    })
    .unwrap();
    assert!(outcome.accepted, "{}", outcome.output);
    assert!(outcome.output.contains("accepted: 2 file(s) checked"));
}

#[test]
fn test_check_command_rejects_bad_byte() {
    let dir = project();
    let sink = CollectedWarnings::new();
    let outcome = with_clean_env(|| {
        commands::check(&options(dir.path()), &[PathBuf::from("bar.h")], &sink)
    })
    .unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.output.contains("bar.h: encoding(ascii) failed"), "{}", outcome.output);
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_check_command_honours_mandatory_override() {
    let dir = project();
    let mut opts = options(dir.path());
    opts.overrides.mandatory = Some(vec!["encoding".to_string()]);
    opts.format = OutputFormat::Json;
    let sink = CollectedWarnings::new();
    let outcome =
        with_clean_env(|| commands::check(&opts, &[PathBuf::from("README.md")], &sink)).unwrap();
    assert!(!outcome.accepted);
    let value: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
    assert_eq!(value["decision"]["reasons"][0]["kind"], "missing-mandatory");
    assert_eq!(value["decision"]["reasons"][0]["missing"][0], "encoding");
}

#[test]
fn test_hook_command_checks_staged_files() {
    let dir = project();
    let repo = Repository::init(dir.path()).unwrap();
    stage(&repo, &[".filemeta", "foo.h", "bar.h"]);

    let mut opts = options(dir.path());
    opts.overrides.fail_fast = Some(false);
    let sink = CollectedWarnings::new();
    let outcome = with_clean_env(|| commands::hook(&opts, None, &sink)).unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.output.contains("FAIL bar.h"), "{}", outcome.output);
    assert!(outcome.output.contains("ok   foo.h"), "{}", outcome.output);
}

#[test]
fn test_hook_command_checks_revision_range() {
    let dir = project();
    let (_repo, base, tip) = history(dir.path());

    let mut opts = options(dir.path());
    opts.overrides.fail_fast = Some(false);
    let sink = CollectedWarnings::new();
    let range = format!("{base}..{tip}");
    let outcome = with_clean_env(|| commands::hook(&opts, Some(&range), &sink)).unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.output.contains("FAIL bar.h"), "{}", outcome.output);
    assert!(outcome.output.contains("ok   foo.h"), "{}", outcome.output);
    assert!(!outcome.output.contains("scratch.md"), "{}", outcome.output);

    let clean = format!("{base}..{base}");
    let outcome = with_clean_env(|| commands::hook(&opts, Some(&clean), &sink)).unwrap();
    assert!(outcome.accepted, "{}", outcome.output);
}

#[test]
fn test_explain_command() {
    let dir = project();
    let sink = CollectedWarnings::new();
    let opts = options(dir.path());
    let (header, readme, other) = with_clean_env(|| {
        (
            commands::explain(&opts, Path::new("include/foo.h"), &sink).unwrap(),
            commands::explain(&opts, Path::new("README.md"), &sink).unwrap(),
            commands::explain(&opts, Path::new("logo.png"), &sink).unwrap(),
        )
    });
    assert_eq!(
        header,
        "include/foo.h: relative-glob:*.h\n  checks: encoding(ascii) mimetype(text/plain)\n"
    );
    assert_eq!(readme, "README.md: relative-glob:*.md\n  checks: bom(false)\n");
    assert_eq!(other, "logo.png: no matching pattern\n");
}

#[test]
fn test_fmt_command_merges_and_writes() {
    let dir = project();
    write(dir.path(), "extra.filemeta", b"syntax: glob\nchecks: encoding(binary)\n*.h\n");
    let mut opts = options(dir.path());
    opts.overrides.pattern_files = Some(vec![".filemeta".into(), "extra.filemeta".into()]);
    let sink = CollectedWarnings::new();

    let text = with_clean_env(|| commands::fmt(&opts, true, &sink)).unwrap();
    assert!(sink.is_empty());
    assert!(text.contains("checks: encoding(binary)\n*.h\n"), "{text}");
    assert_eq!(std::fs::read_to_string(dir.path().join(".filemeta")).unwrap(), text);
}

// ---- binary ----

fn filemeta(root: &Path, home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_filemeta"));
    command.arg("-C").arg(root).env("HOME", home);
    for key in ENV_VARS {
        command.env_remove(key);
    }
    command
}

#[test]
fn test_binary_exit_status_follows_decision() {
    let dir = project();
    let home = TempDir::new().unwrap();

    let ok = filemeta(dir.path(), home.path())
        .args(["check", "foo.h"])
        .output()
        .unwrap();
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("accepted"));

    let rejected = filemeta(dir.path(), home.path())
        .args(["check", "foo.h", "bar.h", "--all", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(rejected.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&rejected.stdout).unwrap();
    assert_eq!(value["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_binary_reports_bad_settings() {
    let dir = project();
    let home = TempDir::new().unwrap();
    let output = filemeta(dir.path(), home.path())
        .args(["--mandatory", "spelling", "check", "foo.h"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("gate.mandatory"));
}
