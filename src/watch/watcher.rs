// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{ModwatchError, Result};
use crate::filter::get_base_paths;
use crate::watch::change::{ChangeKind, ChangeRecord, Mod};
use crate::watch::debounce::run_debounce_loop;
use crate::watch::path_utils::PathNormalizer;

/// Capacity of the batch handoff. Once full, flushing blocks until the
/// consumer catches up.
pub const MOD_CHANNEL_CAPACITY: usize = 1024;

/// Handle for the filesystem subscription.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping or stopping it
/// tears the subscription down and closes the batch channel.
pub struct WatcherHandle {
    inner: Option<RecommendedWatcher>,
    roots: Vec<PathBuf>,
    debounce: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Directories the subscription covers.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Tear down the subscription. Buffered, unflushed changes are dropped.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.inner.take().is_some() {
            self.debounce.abort();
            debug!(roots = ?self.roots, "file watcher stopped");
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Subscribe to the minimal set of directories covering `patterns` and
/// deliver debounced batches on the returned receiver.
///
/// Relative patterns and event paths are resolved against `root`. Failing to
/// subscribe any root is fatal: without it changes would go unnoticed.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    patterns: &[String],
    lull: Duration,
) -> Result<(WatcherHandle, mpsc::Receiver<Mod>)> {
    let normalizer = PathNormalizer::new(root);
    let roots: Vec<PathBuf> = get_base_paths(Vec::new(), patterns)
        .iter()
        .map(|base| normalizer.resolve(Path::new(base)))
        .collect();

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<ChangeRecord>();
    let (mod_tx, mod_rx) = mpsc::channel::<Mod>(MOD_CHANNEL_CAPACITY);

    let callback_normalizer = normalizer.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for record in records_from_event(&callback_normalizer, &event) {
                    if raw_tx.send(record).is_err() {
                        return;
                    }
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    for dir in &roots {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|source| ModwatchError::WatchRoot {
                root: dir.display().to_string(),
                source,
            })?;
    }

    info!(roots = ?roots, lull_ms = lull.as_millis() as u64, "file watcher started");

    let debounce = tokio::spawn(run_debounce_loop(raw_rx, mod_tx, lull));

    Ok((
        WatcherHandle {
            inner: Some(watcher),
            roots,
            debounce,
        },
        mod_rx,
    ))
}

/// Translate one notify event into change records.
fn records_from_event(normalizer: &PathNormalizer, event: &Event) -> Vec<ChangeRecord> {
    event
        .paths
        .iter()
        .filter_map(|path| {
            let kind = change_kind(&event.kind, path)?;
            let rel = normalizer.normalize(path)?;
            Some(ChangeRecord::new(rel, kind))
        })
        .collect()
}

fn change_kind(kind: &EventKind, path: &Path) -> Option<ChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        // Renames arrive once per side; whether the path exists now tells
        // which side this is.
        EventKind::Modify(ModifyKind::Name(_)) => Some(if path.exists() {
            ChangeKind::Created
        } else {
            ChangeKind::Deleted
        }),
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => {
            if path.is_dir() {
                None
            } else {
                Some(ChangeKind::Modified)
            }
        }
    }
}
