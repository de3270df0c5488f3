// src/watch/path_utils.rs

//! Mapping raw event paths onto the pattern namespace.

use std::path::{Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (symlinks, `/private/var` vs `/var` on macOS, ...), we
///   canonicalize and try again. A deleted path cannot be canonicalized, so
///   its parent is canonicalized instead and the file name re-attached.
///
/// Returns `None` if the path does not lie below `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = canonicalize_lenient(path)?;
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(to_slash)
}

fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let parent = path.parent()?.canonicalize().ok()?;
    Some(parent.join(path.file_name()?))
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalizes event paths the way patterns are written: relative to the
/// root when inside it, absolute otherwise.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    root: PathBuf,
}

impl PathNormalizer {
    /// `root` is canonicalized once so event paths (which notify reports in
    /// canonical form) strip cleanly.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if path == Path::new(".") {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// `None` for the root itself, which is never a change target.
    pub fn normalize(&self, path: &Path) -> Option<String> {
        let abs = self.resolve(path);
        let s = relative_str(&self.root, &abs).unwrap_or_else(|| to_slash(&abs));
        let s = s.strip_prefix("./").map(str::to_string).unwrap_or(s);
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}
