// src/filter/mod.rs

//! Glob-based path filtering.
//!
//! Patterns are `/`-separated globs evaluated against paths relative to the
//! directory modwatch was started in:
//! - `*` matches within a single segment,
//! - `**` matches zero or more whole segments,
//! - a trailing `/` anchors the pattern to a directory and everything below it.
//!
//! Broken patterns never abort filtering. They match nothing, and the first
//! compile failure is handed back next to the otherwise-complete result.

pub mod base_path;
pub mod find;
pub mod patterns;

pub use base_path::{base_path, get_base_paths, ROOT};
pub use find::{find, find_with};
pub use patterns::{files, Matches, PathFilter, PatternError};
