// src/watch/change.rs

//! Change records and the debounced batches ("mods") built from them.

use std::collections::HashMap;
use std::fmt;

use crate::filter::{Matches, PathFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl ChangeKind {
    fn sigil(self) -> char {
        match self {
            ChangeKind::Created => '+',
            ChangeKind::Modified => '~',
            ChangeKind::Deleted => '-',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// A single observed change. `path` is `/`-separated and relative to the
/// watch root whenever it lies inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// One flushed batch of changes.
///
/// Records are unique by path and kept in first-seen order; a repeated path
/// keeps its latest kind. Batches delivered by the watcher are never empty,
/// but filtering may produce an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mod {
    records: Vec<ChangeRecord>,
}

impl Mod {
    pub fn from_records(records: impl IntoIterator<Item = ChangeRecord>) -> Self {
        let mut out: Vec<ChangeRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            match index.get(&record.path) {
                Some(&i) => out[i].kind = record.kind,
                None => {
                    index.insert(record.path.clone(), out.len());
                    out.push(record);
                }
            }
        }
        Self { records: out }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact path membership.
    pub fn has(&self, path: &str) -> bool {
        self.records.iter().any(|r| r.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.path.as_str())
    }

    /// Paths that still exist after this batch (created or modified).
    pub fn existing_paths(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.kind != ChangeKind::Deleted)
            .map(|r| r.path.clone())
            .collect()
    }

    /// Narrow this batch to the records passing `includes`/`excludes`.
    pub fn filter<I, E>(&self, includes: I, excludes: E) -> Matches<Mod>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let filter = PathFilter::new(includes, excludes);
        Matches {
            matched: self.filter_with(&filter),
            error: filter.error().cloned(),
        }
    }

    pub fn filter_with(&self, filter: &PathFilter) -> Mod {
        Mod {
            records: self
                .records
                .iter()
                .filter(|r| filter.is_match(&r.path))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {}", record.kind.sigil(), record.path)?;
        }
        Ok(())
    }
}
