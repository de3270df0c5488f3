// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch as signal_watch;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{ConfigSnapshot, LoopExit, Orchestrator, OrchestratorOptions};
use crate::errors::{ModwatchError, Result};
use crate::exec::{DesktopNotifier, Notifier};
use crate::watch::{spawn_watcher, COMMON_EXCLUDES};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the orchestrator (preps, daemons, batch loop)
/// - the file watcher
/// - Ctrl-C / SIGTERM handling
///
/// A config reload tears down the watcher and every daemon, then starts
/// over with the new snapshot.
///
/// The returned future is `Send`, so callers may `tokio::spawn` it.
pub async fn run(args: CliArgs) -> Result<()> {
    if args.ignores {
        print_ignores();
        return Ok(());
    }

    let config_path = PathBuf::from(&args.file);
    let config = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let root = std::env::current_dir().context("resolving working directory")?;
    let options = OrchestratorOptions {
        root: root.clone(),
        config_path: (!args.noconf).then(|| config_path.clone()),
        prep_only: args.prep,
        bell: args.bell,
        notify: args.notify,
        lull: Duration::from_millis(args.lull_ms),
        grace: Duration::from_millis(args.grace_ms),
    };

    let notifier: Option<Arc<dyn Notifier>> = if args.notify {
        match DesktopNotifier::detect() {
            Some(n) => Some(Arc::new(n)),
            None => {
                warn!("--notify given but no desktop notifier was found");
                None
            }
        }
    } else {
        None
    };

    let mut shutdown = spawn_signal_listener();
    let mut snapshot = ConfigSnapshot::initial(config);

    loop {
        info!(version = snapshot.version(), blocks = snapshot.blocks().len(), "config active");
        let orchestrator = Orchestrator::new(snapshot.clone(), options.clone(), notifier.clone());
        let report = orchestrator.initialize().await;

        if options.prep_only {
            return if report.is_success() {
                Ok(())
            } else {
                Err(ModwatchError::PrepOnlyFailed(report.prep_failed.len()))
            };
        }

        let (watcher, mut mods) =
            match spawn_watcher(root.clone(), &orchestrator.watch_patterns(), options.lull) {
                Ok(pair) => pair,
                Err(err) => {
                    orchestrator.terminate().await;
                    return Err(err);
                }
            };

        let exit = orchestrator.watch_loop(&mut mods, &mut shutdown).await;
        watcher.stop();
        orchestrator.terminate().await;

        match exit? {
            LoopExit::Shutdown => return Ok(()),
            LoopExit::Reload(config) => snapshot = snapshot.next(config),
        }
    }
}

/// Flip the returned receiver to `true` on Ctrl-C or SIGTERM.
fn spawn_signal_listener() -> signal_watch::Receiver<bool> {
    let (tx, rx) = signal_watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = tx.send(true);
        // Hold the sender so receivers never observe a closed channel.
        std::future::pending::<()>().await;
    });
    rx
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            warn!(error = %err, "failed to listen for SIGTERM");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "failed to listen for Ctrl+C");
                term.recv().await;
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn print_ignores() {
    println!("Default ignore patterns (disable per block with no_common_filter):");
    for pattern in COMMON_EXCLUDES {
        println!("  {pattern}");
    }
}
