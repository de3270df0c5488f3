// src/filter/patterns.rs

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;

/// A glob that failed to compile.
///
/// This is a warning, not a failure: the offending pattern is dropped and
/// matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid glob pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: globset::Error,
}

/// A filtering result plus the first pattern compile failure, if any.
///
/// Callers must not throw `matched` away when `error` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matches<T> {
    pub matched: T,
    pub error: Option<PatternError>,
}

/// Compiled include/exclude pattern lists.
///
/// A path is kept iff it matches at least one include and no exclude. An
/// empty include list means "everything".
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
    error: Option<PatternError>,
}

impl PathFilter {
    pub fn new<I, E>(includes: I, excludes: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut error = None;

        let includes: Vec<String> = includes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let include = if includes.is_empty() {
            None
        } else {
            Some(build_set(&includes, &mut error))
        };

        let excludes: Vec<String> = excludes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let exclude = build_set(&excludes, &mut error);

        Self {
            include,
            exclude,
            error,
        }
    }

    /// First pattern that failed to compile.
    pub fn error(&self) -> Option<&PatternError> {
        self.error.as_ref()
    }

    pub fn is_included(&self, path: &str) -> bool {
        match &self.include {
            Some(set) => set.is_match(path),
            None => true,
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.is_match(path)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.is_included(path) && !self.is_excluded(path)
    }
}

/// Keep the paths that match an include and no exclude.
///
/// Input order is preserved and nothing is deduplicated.
pub fn files<P, I, E>(paths: P, includes: I, excludes: E) -> Matches<Vec<String>>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    I: IntoIterator,
    I::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let filter = PathFilter::new(includes, excludes);
    let matched = paths
        .into_iter()
        .filter(|p| filter.is_match(p.as_ref()))
        .map(|p| p.as_ref().to_string())
        .collect();

    Matches {
        matched,
        error: filter.error,
    }
}

/// Build a set from every pattern that compiles. Failures are recorded in
/// `error` (first one wins) and skipped.
fn build_set(patterns: &[String], error: &mut Option<PatternError>) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match compile(pattern) {
            Ok(globs) => {
                for glob in globs {
                    builder.add(glob);
                }
            }
            Err(err) => {
                debug!(%pattern, error = %err.source, "dropping pattern that failed to compile");
                error.get_or_insert(err);
            }
        }
    }

    match builder.build() {
        Ok(set) => set,
        Err(source) => {
            error.get_or_insert(PatternError {
                pattern: patterns.join(", "),
                source,
            });
            GlobSet::empty()
        }
    }
}

/// A trailing `/` expands to the directory itself plus its whole subtree.
fn compile(pattern: &str) -> Result<Vec<Glob>, PatternError> {
    let stem = pattern.trim_end_matches('/');
    let sources = if stem.len() < pattern.len() && !stem.is_empty() {
        vec![stem.to_string(), format!("{stem}/**")]
    } else {
        vec![pattern.to_string()]
    };

    sources
        .iter()
        .map(|src| {
            GlobBuilder::new(src)
                .literal_separator(true)
                .build()
                .map_err(|source| PatternError {
                    pattern: pattern.to_string(),
                    source,
                })
        })
        .collect()
}
