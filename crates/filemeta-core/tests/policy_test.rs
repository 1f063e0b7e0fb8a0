//! Tests for the policy language: pattern resolution, `checks:` parsing and
//! the configuration reader.

use filemeta_core::checks::CheckKind;
use filemeta_core::policy::{
    read_policy, read_policy_files, read_policy_raw, resolve_pattern, CheckParser, PolicyReader,
    RawTable, SyntaxKind,
};
use filemeta_core::tracing::CollectedWarnings;

fn keys(text: &str) -> (Vec<String>, CollectedWarnings) {
    let sink = CollectedWarnings::new();
    let table = read_policy([text], &sink);
    (table.keys(), sink)
}

#[test]
fn test_regex_aliases_share_one_descriptor() {
    for line in ["re:x", "regexp:x", "relre:x"] {
        let d = resolve_pattern(line, SyntaxKind::RelativeGlob).unwrap();
        assert_eq!(d.key(), "relative-regex:x", "{line}");
    }
}

#[test]
fn test_hyphenated_keyword_is_not_a_prefix() {
    let d = resolve_pattern("relative-regex:x", SyntaxKind::RelativeGlob).unwrap();
    assert_eq!(d.key(), "relative-glob:relative-regex:x");
    assert_eq!(SyntaxKind::from_keyword("relative-regex").unwrap(), SyntaxKind::RelativeRegex);
}

#[test]
fn test_glob_aliases_share_one_descriptor() {
    for line in ["glob:x", "relglob:x"] {
        let d = resolve_pattern(line, SyntaxKind::RelativeRegex).unwrap();
        assert_eq!(d.key(), "relative-glob:x");
    }
}

#[test]
fn test_syntax_line_sets_default() {
    let (keys, sink) = keys("syntax: glob\n*.h\n");
    assert_eq!(keys, vec!["relative-glob:*.h"]);
    assert!(sink.is_empty());
}

#[test]
fn test_initial_default_is_regex() {
    let (keys, _) = keys(r"\.c$");
    assert_eq!(keys, vec![r"relative-regex:\.c$"]);
}

#[test]
fn test_unknown_prefix_warns_once_and_adds_nothing() {
    let (keys, sink) = keys("bogus:x\n");
    assert!(keys.is_empty());
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_invalid_syntax_keeps_previous_default() {
    let (keys, sink) = keys("syntax: glob\nsyntax: nonsense\n*.c\n");
    assert_eq!(keys, vec!["relative-glob:*.c"]);
    assert_eq!(sink.messages(), vec!["ignoring invalid syntax: 'nonsense'"]);
}

#[test]
fn test_comments_and_escapes() {
    let text = "# header\nsyntax: glob # trailing\n\n   \nissue\\#1.txt   # note\n";
    let (keys, sink) = keys(text);
    assert_eq!(keys, vec!["relative-glob:issue#1.txt"]);
    assert!(sink.is_empty());
}

#[test]
fn test_checks_attach_to_following_patterns() {
    let sink = CollectedWarnings::new();
    let table = read_policy(
        ["syntax: glob\n*.txt\nchecks: encoding(utf-8)\n*.h\n*.c\nchecks:\n*.bin\n"],
        &sink,
    );
    let count = |key: &str| table.get_by_key(key).map(Vec::len);
    assert_eq!(count("relative-glob:*.txt"), Some(0));
    assert_eq!(count("relative-glob:*.h"), Some(1));
    assert_eq!(count("relative-glob:*.c"), Some(1));
    assert_eq!(count("relative-glob:*.bin"), Some(0));
}

#[test]
fn test_redeclared_pattern_overwrites_and_keeps_position() {
    let sink = CollectedWarnings::new();
    let table = read_policy(
        ["syntax: glob\nchecks: bmp()\n*.h\n*.c\nchecks: encoding(ascii)\n*.h\n"],
        &sink,
    );
    assert_eq!(table.keys(), vec!["relative-glob:*.h", "relative-glob:*.c"]);
    let h = table.get_by_key("relative-glob:*.h").unwrap();
    assert_eq!(h.len(), 1);
    assert_eq!(h[0].kind(), CheckKind::Encoding);
}

#[test]
fn test_later_source_overrides_pattern_by_pattern() {
    let sink = CollectedWarnings::new();
    let first = "syntax: glob\nchecks: encoding(ascii)\n*.h\n*.c\n";
    let second = "checks: encoding(utf-8)\n*.c\n*.md\n";
    let table = read_policy([first, second], &sink);

    // syntax carries over into the second source
    assert_eq!(
        table.keys(),
        vec!["relative-glob:*.h", "relative-glob:*.c", "relative-glob:*.md"]
    );
    assert_eq!(table.get_by_key("relative-glob:*.h").unwrap()[0].args(), ["ascii"]);
    assert_eq!(table.get_by_key("relative-glob:*.c").unwrap()[0].args(), ["utf-8"]);
}

#[test]
fn test_pending_checks_start_empty_in_each_source() {
    let sink = CollectedWarnings::new();
    let table = read_policy(["checks: bmp()\na\n", "b\n"], &sink);
    assert_eq!(table.get_by_key("relative-regex:a").unwrap().len(), 1);
    assert!(table.get_by_key("relative-regex:b").unwrap().is_empty());
}

#[test]
fn test_two_invocations_regardless_of_quotes() {
    for payload in [
        "encoding('utf-8') mimetype('text/plain')",
        r#"encoding("utf-8") mimetype("text/plain")"#,
        "encoding(utf-8) mimetype(text/plain)",
    ] {
        let sink = CollectedWarnings::new();
        let checks = CheckParser::new(&sink).parse(payload);
        assert_eq!(checks.len(), 2, "{payload}");
        assert_eq!(checks[0].kind, CheckKind::Encoding);
        assert_eq!(checks[0].args, vec!["utf-8"]);
        assert_eq!(checks[1].kind, CheckKind::MimeType);
        assert_eq!(checks[1].args, vec!["text/plain"]);
        assert!(sink.is_empty());
    }
}

#[test]
fn test_unknown_check_is_skipped_individually() {
    let sink = CollectedWarnings::new();
    let checks = CheckParser::new(&sink).resolve("encoding('utf-8') bogus() bom('true')");
    let kinds: Vec<CheckKind> = checks.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec![CheckKind::Encoding, CheckKind::Bom]);
    assert_eq!(sink.len(), 1);
    assert!(sink.messages()[0].contains("bogus"));
}

#[test]
fn test_malformed_line_yields_single_warning() {
    let sink = CollectedWarnings::new();
    let checks = CheckParser::new(&sink).parse("encoding(utf-8 bom(");
    assert!(checks.is_empty());
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_raw_reader_keeps_fragments() {
    let sink = CollectedWarnings::new();
    let table = read_policy_raw(["syntax: glob\nchecks: encoding('ascii')  bmp()\n*.h\n"], &sink);
    assert_eq!(
        table.get_by_key("relative-glob:*.h"),
        Some(&vec!["encoding('ascii')".to_string(), "bmp()".to_string()])
    );
}

#[test]
fn test_reader_state_is_observable() {
    let sink = CollectedWarnings::new();
    let mut reader = PolicyReader::new(&sink).with_default_syntax(SyntaxKind::Path);
    let mut table = RawTable::new();
    reader.read_raw(&mut table, ["docs", "syntax: rootglob"]);
    assert_eq!(reader.syntax(), SyntaxKind::RootGlob);
    assert_eq!(table.keys(), vec!["path:docs"]);
}

#[test]
fn test_policy_files_missing_are_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    let present = dir.path().join(".filemeta");
    std::fs::write(&present, "syntax: glob\nchecks: encoding(ascii)\n*.h\n").unwrap();
    let missing = dir.path().join("nowhere.filemeta");

    let sink = CollectedWarnings::new();
    let table =
        read_policy_files(&[missing, present], SyntaxKind::default(), &sink).unwrap();
    assert_eq!(table.keys(), vec!["relative-glob:*.h"]);
}
