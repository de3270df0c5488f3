// tests/filter_files.rs
mod common;
use crate::common::{init_tracing, TestResult};

use modwatch::filter::{base_path, files, get_base_paths, PathFilter};

const SOURCES: &[&str] = &["main.cpp", "main.go", "main.h", "foo.go", "bar.py"];

struct FilesCase {
    includes: &'static [&'static str],
    excludes: &'static [&'static str],
    paths: &'static [&'static str],
    expected: &'static [&'static str],
    err: bool,
}

const FILES_CASES: &[FilesCase] = &[
    FilesCase {
        includes: &[],
        excludes: &["*"],
        paths: SOURCES,
        expected: &[],
        err: false,
    },
    FilesCase {
        includes: &["*"],
        excludes: &[],
        paths: SOURCES,
        expected: SOURCES,
        err: false,
    },
    FilesCase {
        includes: &["*"],
        excludes: &["*.go"],
        paths: SOURCES,
        expected: &["main.cpp", "main.h", "bar.py"],
        err: false,
    },
    // Invalid patterns match nothing and are reported, not fatal.
    FilesCase {
        includes: &["*"],
        excludes: &["[["],
        paths: SOURCES,
        expected: SOURCES,
        err: true,
    },
    FilesCase {
        includes: &["main.*"],
        excludes: &["*.cpp"],
        paths: SOURCES,
        expected: &["main.go", "main.h"],
        err: false,
    },
    // No includes at all means everything.
    FilesCase {
        includes: &[],
        excludes: &[],
        paths: SOURCES,
        expected: SOURCES,
        err: false,
    },
    FilesCase {
        includes: &["**/*"],
        excludes: &[],
        paths: &["foo", "/test/foo", "/test/foo.go"],
        expected: &["foo", "/test/foo", "/test/foo.go"],
        err: false,
    },
];

#[test]
fn files_table() -> TestResult {
    init_tracing();

    for (i, case) in FILES_CASES.iter().enumerate() {
        let result = files(case.paths, case.includes, case.excludes);
        assert_eq!(
            result.matched, case.expected,
            "case {i}: inc {:?}, ex {:?}",
            case.includes, case.excludes
        );
        assert_eq!(result.error.is_some(), case.err, "case {i}: error flag");
    }
    Ok(())
}

#[test]
fn invalid_pattern_error_names_the_pattern() {
    let result = files(SOURCES, ["*"], ["[["]);
    let err = result.error.expect("[[ must not compile");
    assert_eq!(err.pattern, "[[");
    assert!(err.to_string().contains("[["));
}

#[test]
fn star_does_not_cross_directories() {
    let result = files(["a.go", "pkg/b.go", "pkg/sub/c.go"], ["*.go"], [] as [&str; 0]);
    assert_eq!(result.matched, vec!["a.go"]);

    let result = files(["a.go", "pkg/b.go", "pkg/sub/c.go"], ["**/*.go"], [] as [&str; 0]);
    assert_eq!(result.matched, vec!["a.go", "pkg/b.go", "pkg/sub/c.go"]);
}

#[test]
fn trailing_slash_excludes_whole_directory() {
    let paths = ["vendor", "vendor/x.go", "vendor/deep/y.go", "vendored.go", "main.go"];
    let result = files(paths, ["**"], ["vendor/"]);
    assert_eq!(result.matched, vec!["vendored.go", "main.go"]);
    assert!(result.error.is_none());
}

#[test]
fn duplicates_and_order_are_preserved() {
    let result = files(["b.go", "a.go", "b.go"], ["*.go"], [] as [&str; 0]);
    assert_eq!(result.matched, vec!["b.go", "a.go", "b.go"]);
}

#[test]
fn path_filter_reports_include_and_exclude_separately() {
    let filter = PathFilter::new(["src/**"], ["**/*.tmp"]);
    assert!(filter.is_included("src/a.rs"));
    assert!(filter.is_included("src/a.tmp"));
    assert!(filter.is_excluded("src/a.tmp"));
    assert!(filter.is_match("src/a.rs"));
    assert!(!filter.is_match("src/a.tmp"));
    assert!(!filter.is_match("README.md"));
    assert!(filter.error().is_none());
}

#[test]
fn base_path_table() {
    let cases = [
        ("foo", "."),
        ("test/foo", "test"),
        ("test/foo*", "test"),
        ("test/*.**", "test"),
        ("**/*", "."),
        ("foo*/bar", "."),
        ("foo/**/bar", "foo"),
        ("/voing/**", "/voing"),
        ("./src/*.go", "src"),
        ("src/", "src"),
    ];

    for (i, (pattern, expected)) in cases.iter().enumerate() {
        assert_eq!(base_path(pattern), *expected, "case {i}: {pattern:?}");
    }
}

#[test]
fn get_base_paths_table() {
    let cases: &[(&[&str], &[&str])] = &[
        (&["foo"], &["."]),
        (&["foo", "bar"], &["."]),
        (&["foo", "bar", "/voing/**"], &[".", "/voing"]),
        (&["foo/**", "**"], &["."]),
        (&["foo/**", "**", "/bar/**"], &[".", "/bar"]),
        (&["a/b/*.go", "a/*.go"], &["a"]),
        (&["a/*.go", "b/*.go"], &["a", "b"]),
    ];

    for (i, (patterns, expected)) in cases.iter().enumerate() {
        let bases = get_base_paths(Vec::new(), patterns.iter());
        assert_eq!(bases, *expected, "case {i}: {patterns:?}");
    }
}

#[test]
fn get_base_paths_is_never_empty() {
    let bases = get_base_paths(Vec::new(), [] as [&str; 0]);
    assert_eq!(bases, vec!["."]);
}

#[test]
fn get_base_paths_extends_existing_bases() {
    let bases = get_base_paths(vec!["src".to_string()], ["src/deep/*.rs", "docs/*.md"]);
    assert_eq!(bases, vec!["src", "docs"]);
}
