use std::collections::BTreeSet;
use std::path::Path;

use crate::core::config::MatchesOptions;
use crate::core::engine::Matcher;
use crate::core::error::MatchError;
use crate::core::fs::{Filesystem, MemoryFilesystem};
use crate::core::result::MatchesResult;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn matcher(build: impl FnOnce(&mut MemoryFilesystem)) -> Matcher<MemoryFilesystem> {
    let mut fs = MemoryFilesystem::new();
    fs.add_dir("/proj");
    build(&mut fs);
    Matcher::new(fs)
}

fn run(matcher: &Matcher<MemoryFilesystem>, options: &MatchesOptions) -> MatchesResult {
    matcher.matches("/proj", options).unwrap()
}

#[test]
fn test_missing_base_directory() {
    let matcher = matcher(|_| {});
    let err = matcher
        .matches("/elsewhere", &MatchesOptions::default())
        .unwrap_err();
    assert!(matches!(err, MatchError::NotFound { .. }));
}

#[test]
fn test_base_directory_is_a_file() {
    let matcher = matcher(|fs| {
        fs.add_file("/notes.txt", "");
    });
    let err = matcher
        .matches("/notes.txt", &MatchesOptions::default())
        .unwrap_err();
    assert!(matches!(err, MatchError::NotFound { .. }));
}

#[test]
fn test_without_ignorefile_everything_is_unmatched() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/a.txt", "").add_file("/proj/sub/b.txt", "");
    });
    let result = run(&matcher, &MatchesOptions::default());
    assert!(result.matched_files.is_empty());
    assert!(result.matched_dirs.is_empty());
    assert_eq!(result.unmatched_files, strings(&["a.txt", "sub/b.txt"]));
    assert_eq!(result.unmatched_dirs, strings(&["sub"]));
}

#[test]
fn test_exclusion_after_wildcard() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "a/*\n!a/keep.txt\n")
            .add_file("/proj/a/keep.txt", "")
            .add_file("/proj/a/drop.txt", "");
    });
    let result = run(&matcher, &MatchesOptions::default());
    assert_eq!(result.matched_files, strings(&["a/drop.txt"]));
    assert_eq!(result.unmatched_files, strings(&[".xignore", "a/keep.txt"]));
    assert_eq!(result.unmatched_dirs, strings(&["a"]));
}

#[test]
fn test_explicit_exclusion_beats_directory_cascade() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "d\n!d/special.txt\n")
            .add_file("/proj/d/x.txt", "")
            .add_file("/proj/d/special.txt", "")
            .add_file("/proj/d/sub/y.txt", "");
    });
    let result = run(&matcher, &MatchesOptions::default());
    assert_eq!(result.matched_files, strings(&["d/sub/y.txt", "d/x.txt"]));
    assert_eq!(result.matched_dirs, strings(&["d", "d/sub"]));
    assert_eq!(result.unmatched_files, strings(&[".xignore", "d/special.txt"]));
    assert!(result.unmatched_dirs.is_empty());
}

#[test]
fn test_nested_ignorefile_refines_parent() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "inner\n")
            .add_file("/proj/inner/.xignore", "!keep.md\n")
            .add_file("/proj/inner/keep.md", "")
            .add_file("/proj/inner/other.md", "");
    });

    let flat = run(&matcher, &MatchesOptions::default());
    assert!(flat.matched_files.contains(&"inner/keep.md".to_string()));

    let nested = run(&matcher, &MatchesOptions::default().nested(true));
    assert_eq!(
        nested.matched_files,
        strings(&["inner/.xignore", "inner/other.md"])
    );
    assert_eq!(nested.matched_dirs, strings(&["inner"]));
    assert_eq!(nested.unmatched_files, strings(&[".xignore", "inner/keep.md"]));
}

#[test]
fn test_before_and_after_rules_bracket_the_ignorefile() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "*.log\n!notes.txt\n")
            .add_file("/proj/a.log", "")
            .add_file("/proj/keep.log", "")
            .add_file("/proj/notes.txt", "");
    });
    let options = MatchesOptions::default()
        .before_patterns(["notes.txt", "!a.log"])
        .after_patterns(["!keep.log"]);
    let result = run(&matcher, &options);
    assert_eq!(result.matched_files, strings(&["a.log"]));
    assert_eq!(
        result.unmatched_files,
        strings(&[".xignore", "keep.log", "notes.txt"])
    );
}

#[test]
fn test_custom_ignorefile_name() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.dockerignore", "*.tmp\n")
            .add_file("/proj/.xignore", "*.md\n")
            .add_file("/proj/a.tmp", "")
            .add_file("/proj/b.md", "");
    });
    let result = run(&matcher, &MatchesOptions::new(".dockerignore"));
    assert_eq!(result.matched_files, strings(&["a.tmp"]));

    let result = run(&matcher, &MatchesOptions::new(""));
    assert_eq!(result.matched_files, strings(&["b.md"]));
}

#[test]
fn test_malformed_rule_fails_the_call() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "*.log\n[abc\n")
            .add_file("/proj/a.log", "");
    });
    let err = matcher
        .matches("/proj", &MatchesOptions::default())
        .unwrap_err();
    match err {
        MatchError::Pattern { pattern, .. } => assert_eq!(pattern, "[abc"),
        other => panic!("expected a pattern error, got {other:?}"),
    }

    let matcher = matcher_with_clean_file();
    let options = MatchesOptions::default().after_patterns(["ok", "bad\\"]);
    assert!(matches!(
        matcher.matches("/proj", &options),
        Err(MatchError::Pattern { .. })
    ));
}

fn matcher_with_clean_file() -> Matcher<MemoryFilesystem> {
    matcher(|fs| {
        fs.add_file("/proj/.xignore", "*.log\n").add_file("/proj/a.log", "");
    })
}

#[test]
fn test_stat_failure_on_matched_entry_is_fatal() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "broken\n")
            .add_stat_error("/proj/broken");
    });
    let err = matcher
        .matches("/proj", &MatchesOptions::default())
        .unwrap_err();
    assert!(matches!(err, MatchError::Io { .. }));
}

#[test]
fn test_stat_failure_on_unmatched_entry_is_recorded() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "*.log\n")
            .add_file("/proj/a.log", "")
            .add_stat_error("/proj/flaky");
    });
    let result = run(&matcher, &MatchesOptions::default());
    assert_eq!(result.error_dirs, strings(&["flaky"]));
    assert_eq!(result.matched_files, strings(&["a.log"]));
    assert!(!result.unmatched_files.contains(&"flaky".to_string()));
    assert!(result.has_errors());
}

#[test]
fn test_unreadable_entries_are_reported_not_classified() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "locked\n*.txt\n")
            .add_walk_error("/proj/locked")
            .add_file("/proj/locked/secret.txt", "")
            .add_file("/proj/open.txt", "");
    });
    let result = run(&matcher, &MatchesOptions::default());
    assert_eq!(result.error_files, strings(&["locked"]));
    assert_eq!(result.matched_files, strings(&["open.txt"]));
    assert!(result.matched_dirs.is_empty());
    assert!(result.error_dirs.is_empty());
}

#[test]
fn test_lists_are_disjoint_and_cover_the_tree() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "build\n!build/keep\n**/*.o\n")
            .add_file("/proj/build/keep", "")
            .add_file("/proj/build/out.bin", "")
            .add_file("/proj/src/main.c", "")
            .add_file("/proj/src/main.o", "")
            .add_walk_error("/proj/private")
            .add_stat_error("/proj/gone");
    });
    let result = run(&matcher, &MatchesOptions::default());

    let lists = [
        &result.matched_files,
        &result.unmatched_files,
        &result.matched_dirs,
        &result.unmatched_dirs,
        &result.error_files,
        &result.error_dirs,
    ];
    let mut seen = BTreeSet::new();
    for list in lists {
        for path in list {
            assert!(seen.insert(path.clone()), "{path} listed twice");
        }
    }
    let expected: BTreeSet<String> = strings(&[
        ".xignore",
        "build",
        "build/keep",
        "build/out.bin",
        "gone",
        "private",
        "src",
        "src/main.c",
        "src/main.o",
    ])
    .into_iter()
    .collect();
    assert_eq!(seen, expected);
    assert_eq!(result.classified(), 7);
}

#[test]
fn test_repeated_calls_are_identical() {
    let matcher = matcher(|fs| {
        fs.add_file("/proj/.xignore", "inner\n")
            .add_file("/proj/inner/.xignore", "!*.md\n")
            .add_file("/proj/inner/a.md", "")
            .add_file("/proj/inner/b.rs", "");
    });
    let options = MatchesOptions::default().nested(true);
    let first = run(&matcher, &options);
    let second = run(&matcher, &options);
    assert_eq!(first, second);

    // The same matcher serves calls with different options.
    let flat = run(&matcher, &MatchesOptions::default());
    assert!(matcher.filesystem().exists(Path::new("/proj/inner/a.md")).unwrap());
    assert_ne!(flat, first);
    assert_eq!(run(&matcher, &options), first);
}
