// src/filter/find.rs

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::filter::patterns::{Matches, PathFilter};
use crate::fs::{FileSystem, RealFileSystem};

/// Recursively collect the files under `root` that pass the include/exclude
/// test. Returned paths are relative to `root` and sorted.
///
/// A directory matched by an exclude (e.g. `a/`) is pruned: nothing below it
/// is visited.
pub fn find<I, E>(root: impl AsRef<Path>, includes: I, excludes: E) -> Result<Matches<Vec<String>>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let filter = PathFilter::new(includes, excludes);
    find_with(&RealFileSystem, root.as_ref(), &filter)
}

/// Like [`find`], over an arbitrary [`FileSystem`] with a precompiled filter.
pub fn find_with(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &PathFilter,
) -> Result<Matches<Vec<String>>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace('\\', "/");

            if fs.is_dir(&path) {
                if filter.is_excluded(&rel) {
                    debug!(dir = %rel, "pruning excluded directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) && filter.is_match(&rel) {
                files.push(rel);
            }
        }
    }

    files.sort();
    Ok(Matches {
        matched: files,
        error: filter.error().cloned(),
    })
}
