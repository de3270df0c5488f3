// src/filter/base_path.rs

//! Minimal traversal roots for a set of patterns.

/// The traversal root. Every relative path lives below it.
pub const ROOT: &str = ".";

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '\\'];

/// Longest literal directory prefix of `pattern`.
///
/// - `test/foo*` -> `test`
/// - `foo*/bar` -> `.`
/// - `/voing/**` -> `/voing`
/// - a pattern without wildcards yields its parent directory, except a
///   directory-anchored one (`src/`) which yields the directory itself.
pub fn base_path(pattern: &str) -> String {
    let anchored = pattern.len() > 1 && pattern.ends_with('/');
    let trimmed = if anchored {
        pattern.trim_end_matches('/')
    } else {
        pattern
    };
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);

    let segments: Vec<&str> = trimmed.split('/').collect();
    let literal = match segments.iter().position(|s| s.contains(GLOB_META)) {
        Some(idx) => &segments[..idx],
        None if anchored => &segments[..],
        None => &segments[..segments.len() - 1],
    };

    if literal.is_empty() || literal == ["."] {
        return ROOT.to_string();
    }
    let joined = literal.join("/");
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Fold the base paths of `patterns` into `bases`.
///
/// A candidate already covered by an entry is dropped, and entries covered
/// by a new candidate are removed, so the result never holds a path together
/// with one of its ancestors. `.` covers every relative path; absolute paths
/// outside the tree survive next to it. The result is never empty.
pub fn get_base_paths<I>(mut bases: Vec<String>, patterns: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for pattern in patterns {
        let candidate = base_path(pattern.as_ref());
        if bases.iter().any(|b| covers(b, &candidate)) {
            continue;
        }
        bases.retain(|b| !covers(&candidate, b));
        bases.push(candidate);
    }

    if bases.is_empty() {
        bases.push(ROOT.to_string());
    }
    bases
}

/// True if `path` is `ancestor` or lies below it.
fn covers(ancestor: &str, path: &str) -> bool {
    if ancestor == path {
        return true;
    }
    match ancestor {
        ROOT => !path.starts_with('/'),
        "/" => path.starts_with('/'),
        _ => path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/')),
    }
}
