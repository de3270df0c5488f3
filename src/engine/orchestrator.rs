// src/engine/orchestrator.rs

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{load_and_validate, Block};
use crate::errors::{ModwatchError, Result};
use crate::exec::{run_preps, Notifier, PrepError, PrepScope, Supervisor, NOTIFY_TITLE};
use crate::filter::PathFilter;
use crate::watch::{Mod, PathNormalizer};

use super::snapshot::ConfigSnapshot;
use super::{BatchOutcome, BatchReport, InitReport, LoopExit, OrchestratorOptions};

/// A block as the orchestrator runs it: compiled patterns plus its
/// supervisor.
struct ActiveBlock {
    block: Block,
    filter: PathFilter,
    supervisor: Supervisor,
}

/// Drives one configuration snapshot from startup to shutdown or reload.
///
/// Batches are processed one at a time, blocks in config order, and a
/// block's preps always finish before its restart is requested. Restarts
/// are fire-and-forget; the supervisor serializes them.
pub struct Orchestrator {
    snapshot: ConfigSnapshot,
    blocks: Vec<ActiveBlock>,
    options: OrchestratorOptions,
    notifier: Option<Arc<dyn Notifier>>,
    /// Config file as it appears in change batches.
    config_key: Option<String>,
    /// Config file resolved against the root, for re-reading.
    config_file: Option<PathBuf>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("version", &self.snapshot.version())
            .field("blocks", &self.blocks.len())
            .field("config_key", &self.config_key)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        snapshot: ConfigSnapshot,
        options: OrchestratorOptions,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        let normalizer = PathNormalizer::new(options.root.clone());
        let config_file = options
            .config_path
            .as_deref()
            .map(|p| normalizer.resolve(p));
        let config_key = config_file
            .as_deref()
            .and_then(|p| normalizer.normalize(p));

        let blocks = snapshot
            .blocks()
            .iter()
            .map(|block| {
                let filter = PathFilter::new(&block.include, &block.exclude);
                if let Some(err) = filter.error() {
                    warn!(block = %block.label(), error = %err, "pattern matches nothing");
                }
                ActiveBlock {
                    supervisor: Supervisor::new(block.label(), options.grace),
                    filter,
                    block: block.clone(),
                }
            })
            .collect();

        Self {
            snapshot,
            blocks,
            options,
            notifier,
            config_key,
            config_file,
        }
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    pub fn supervisor(&self, index: usize) -> Option<&Supervisor> {
        self.blocks.get(index).map(|b| &b.supervisor)
    }

    /// The config file's path as it shows up in change batches, when
    /// self-watching is on.
    pub fn config_key(&self) -> Option<&str> {
        self.config_key.as_deref()
    }

    /// Patterns the watcher must cover: every block's includes, plus the
    /// config file itself.
    pub fn watch_patterns(&self) -> Vec<String> {
        let mut patterns = self.snapshot.config().watch_patterns();
        if let Some(key) = &self.config_key {
            patterns.push(key.clone());
        }
        patterns
    }

    /// Run every block's preps unconditionally, then start its daemons
    /// (skipped in prep-only mode). Failures stay scoped to their block.
    pub async fn initialize(&self) -> InitReport {
        let mut report = InitReport::default();

        for active in &self.blocks {
            let block = &active.block;
            if let Err(err) = run_preps(block, PrepScope::Everything).await {
                self.report_prep_failure(block, &err);
                report.prep_failed.push(block.index);
            }

            if self.options.prep_only {
                continue;
            }
            if let Err(err) = active
                .supervisor
                .start(block.daemon.clone(), block.variables.clone())
                .await
            {
                error!(block = %block.label(), error = %err, "daemon setup failed");
            }
        }

        report
    }

    /// Handle one change batch.
    pub async fn process_batch(&self, batch: &Mod) -> BatchOutcome {
        if self.config_key.as_deref().is_some_and(|key| batch.has(key)) {
            return self.reload();
        }

        debug!("delta:\n{batch}");
        let mut report = BatchReport::default();

        for active in &self.blocks {
            let block = &active.block;
            let scoped = batch.filter_with(&active.filter);
            if scoped.is_empty() {
                continue;
            }
            report.matched.push(block.index);

            if let Err(err) = run_preps(block, PrepScope::Changes(&scoped)).await {
                self.report_prep_failure(block, &err);
                report.failed.push(block.index);
                continue;
            }

            match active.supervisor.restart() {
                Ok(_generation) => report.restarted.push(block.index),
                Err(err) => warn!(block = %block.label(), error = %err, "restart not possible"),
            }
        }

        BatchOutcome::Processed(report)
    }

    /// Consume batches in delivery order until shutdown is signalled or the
    /// config file changes.
    ///
    /// The batch channel closing under us means the filesystem subscription
    /// died, which is fatal.
    pub async fn watch_loop(
        &self,
        mods: &mut mpsc::Receiver<Mod>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<LoopExit> {
        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => {
                    info!("shutdown requested");
                    return Ok(LoopExit::Shutdown);
                }
                batch = mods.recv() => {
                    let Some(batch) = batch else {
                        return Err(ModwatchError::SubscriptionClosed);
                    };
                    if let BatchOutcome::Reload(config) = self.process_batch(&batch).await {
                        return Ok(LoopExit::Reload(config));
                    }
                }
            }
        }
    }

    /// Shut down every block's supervisor concurrently and wait for all of
    /// them.
    pub async fn terminate(&self) {
        let mut pending = JoinSet::new();
        for active in &self.blocks {
            let supervisor = active.supervisor.clone();
            pending.spawn(async move { supervisor.shutdown().await });
        }
        while let Some(res) = pending.join_next().await {
            if let Err(err) = res {
                warn!(error = %err, "supervisor shutdown task failed");
            }
        }
    }

    fn reload(&self) -> BatchOutcome {
        let Some(path) = &self.config_file else {
            return BatchOutcome::ReloadRejected;
        };

        match load_and_validate(path) {
            Ok(config) => {
                info!(path = %path.display(), "reloading config");
                BatchOutcome::Reload(config)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "reloading config failed; keeping current config");
                BatchOutcome::ReloadRejected
            }
        }
    }

    fn report_prep_failure(&self, block: &Block, err: &PrepError) {
        match err {
            PrepError::CommandFailed { output, .. } => {
                error!(block = %block.label(), error = %err, "prep failed");
                if self.options.bell {
                    ring_bell();
                }
                if self.options.notify {
                    match &self.notifier {
                        Some(notifier) => {
                            let text = if output.trim().is_empty() {
                                err.to_string()
                            } else {
                                output.clone()
                            };
                            notifier.push(NOTIFY_TITLE, &text);
                        }
                        None => warn!("could not find a desktop notifier"),
                    }
                }
            }
            PrepError::Setup { .. } => {
                error!(block = %block.label(), error = %err, "prep could not run");
            }
        }
    }
}

fn ring_bell() {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

/// Resolves once `shutdown` flips to `true` or its sender is gone. The
/// borrowed value is dropped here, keeping `watch_loop` `Send`.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
