// src/engine/mod.rs

//! Orchestration engine for modwatch.
//!
//! This module ties together:
//! - the immutable, versioned configuration snapshot,
//! - per-block path filters and process supervisors,
//! - the sequential batch loop that reacts to:
//!   - debounced change batches,
//!   - edits to the config file itself (hot reload),
//!   - shutdown signals.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::exec::DEFAULT_GRACE_PERIOD;

pub mod orchestrator;
pub mod snapshot;

pub use orchestrator::Orchestrator;
pub use snapshot::ConfigSnapshot;

/// Default quiet period before a change batch is flushed.
pub const DEFAULT_LULL: Duration = Duration::from_millis(100);

/// Knobs the orchestrator is started with. Survive config reloads.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Directory relative patterns and paths are resolved against.
    pub root: PathBuf,
    /// Config file to watch for hot reload; `None` disables self-watching.
    pub config_path: Option<PathBuf>,
    /// Run preps once, never start daemons.
    pub prep_only: bool,
    /// Ring the terminal bell when a prep command fails.
    pub bell: bool,
    /// Push a desktop notification when a prep command fails.
    pub notify: bool,
    pub lull: Duration,
    pub grace: Duration,
}

impl OrchestratorOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_path: None,
            prep_only: false,
            bell: false,
            notify: false,
            lull: DEFAULT_LULL,
            grace: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// Result of the startup pass over all blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Blocks (by index) whose prep commands failed.
    pub prep_failed: Vec<usize>,
}

impl InitReport {
    pub fn is_success(&self) -> bool {
        self.prep_failed.is_empty()
    }
}

/// What happened to each block for one change batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Blocks with at least one relevant change.
    pub matched: Vec<usize>,
    /// Blocks whose prep commands failed; their daemons were left alone.
    pub failed: Vec<usize>,
    /// Blocks whose supervisor was asked to restart.
    pub restarted: Vec<usize>,
}

/// Outcome of [`Orchestrator::process_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Processed(BatchReport),
    /// The config file changed and parsed cleanly.
    Reload(Config),
    /// The config file changed but could not be loaded; nothing else in the
    /// batch was processed and the current config stays active.
    ReloadRejected,
}

/// Why [`Orchestrator::watch_loop`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    Reload(Config),
    Shutdown,
}
