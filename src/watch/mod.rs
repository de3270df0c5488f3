// src/watch/mod.rs

//! File watching and change aggregation.
//!
//! This module is responsible for:
//! - computing the minimal set of directories to subscribe to,
//! - wiring up a cross-platform filesystem watcher (`notify`),
//! - debouncing the raw notification storm into ordered [`Mod`] batches.
//!
//! It does **not** know about blocks or commands; deciding which batch is
//! relevant to whom is the engine's job.

pub mod change;
pub mod debounce;
pub mod excludes;
pub mod path_utils;
pub mod watcher;

pub use change::{ChangeKind, ChangeRecord, Mod};
pub use debounce::{run_debounce_loop, Debouncer};
pub use excludes::COMMON_EXCLUDES;
pub use path_utils::{relative_str, PathNormalizer};
pub use watcher::{spawn_watcher, WatcherHandle, MOD_CHANNEL_CAPACITY};
