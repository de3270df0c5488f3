// src/exec/supervisor.rs

//! Per-block daemon supervision.
//!
//! A [`Supervisor`] owns the long-lived processes of one block. Every stop
//! and start runs while holding the process list lock, so stop/start
//! sequences never interleave. Each restart is tagged with a generation; a
//! restart that finishes stopping after a newer one was requested skips its
//! start, leaving the newest generation as the only one that spawns. Per
//! daemon command there is therefore never more than one live process.
//!
//! Daemons that exit on their own are logged and left down. Only a relevant
//! file change restarts them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Child;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::exec::shell::{forward_lines, shell_command};

/// How long a daemon gets between SIGTERM and SIGKILL.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Restarting,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn daemon `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SupervisorState,
    },
}

/// What `start` was given; replayed by every restart.
#[derive(Debug, Clone, Default)]
struct Launch {
    commands: Vec<String>,
    variables: BTreeMap<String, String>,
}

/// One spawned daemon.
///
/// - `stop` asks the watching task to terminate the process.
/// - `handle` is the task owning the `Child`; it finishes once the process
///   is gone, whether it exited on its own or was stopped.
struct DaemonProcess {
    command: String,
    pid: Option<u32>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

struct Shared {
    label: String,
    grace: Duration,
    state: Mutex<SupervisorState>,
    launch: Mutex<Launch>,
    generation: AtomicU64,
    procs: AsyncMutex<Vec<DaemonProcess>>,
}

/// Supervisor for one block's daemons. Cloning yields another handle to the
/// same supervisor.
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("label", &self.shared.label)
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Supervisor {
    pub fn new(label: impl Into<String>, grace: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                label: label.into(),
                grace,
                state: Mutex::new(SupervisorState::Idle),
                launch: Mutex::new(Launch::default()),
                generation: AtomicU64::new(0),
                procs: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn state(&self) -> SupervisorState {
        *lock(&self.shared.state)
    }

    /// Tag of the most recent restart or shutdown request.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// PIDs of tracked daemons that are still running. Waits for any stop or
    /// start in flight to finish first.
    pub async fn live_pids(&self) -> Vec<u32> {
        let procs = self.shared.procs.lock().await;
        procs
            .iter()
            .filter(|p| !p.handle.is_finished())
            .filter_map(|p| p.pid)
            .collect()
    }

    /// Spawn every daemon command. Only valid from `Idle`.
    ///
    /// A command that fails to spawn does not stop the others; the first
    /// failure is returned once all have been tried.
    pub async fn start(
        &self,
        commands: Vec<String>,
        variables: BTreeMap<String, String>,
    ) -> Result<(), SupervisorError> {
        {
            let state = lock(&self.shared.state);
            if *state != SupervisorState::Idle {
                return Err(SupervisorError::InvalidState {
                    operation: "start",
                    state: *state,
                });
            }
        }
        *lock(&self.shared.launch) = Launch {
            commands,
            variables,
        };

        let mut procs = self.shared.procs.lock().await;
        // A shutdown may have run while the list lock was free.
        {
            let state = lock(&self.shared.state);
            if *state != SupervisorState::Idle {
                return Err(SupervisorError::InvalidState {
                    operation: "start",
                    state: *state,
                });
            }
        }
        let result = self.shared.spawn_all(&mut procs);
        {
            let mut state = lock(&self.shared.state);
            if *state == SupervisorState::Idle {
                *state = SupervisorState::Running;
            }
        }
        info!(block = %self.shared.label, daemons = procs.len(), "supervisor running");
        result
    }

    /// Request a stop/start cycle and return its generation without waiting
    /// for it.
    ///
    /// Valid from `Running` or `Restarting`. A newer request supersedes an
    /// older one still in flight: the older one still completes its stop but
    /// skips its start.
    pub fn restart(&self) -> Result<u64, SupervisorError> {
        let generation = {
            let mut state = lock(&self.shared.state);
            match *state {
                SupervisorState::Running | SupervisorState::Restarting => {}
                other => {
                    return Err(SupervisorError::InvalidState {
                        operation: "restart",
                        state: other,
                    });
                }
            }
            *state = SupervisorState::Restarting;
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        debug!(block = %self.shared.label, generation, "restart requested");
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.restart_generation(generation).await });
        Ok(generation)
    }

    /// Stop every daemon (SIGTERM, then SIGKILL after the grace period) and
    /// wait until all are gone. Idempotent.
    pub async fn shutdown(&self) {
        let first = {
            let mut state = lock(&self.shared.state);
            match *state {
                SupervisorState::Stopped => return,
                SupervisorState::ShuttingDown => false,
                _ => {
                    *state = SupervisorState::ShuttingDown;
                    // Any restart still in flight is now stale and will not start.
                    self.shared.generation.fetch_add(1, Ordering::SeqCst);
                    true
                }
            }
        };

        let mut procs = self.shared.procs.lock().await;
        self.shared.stop_all(&mut procs).await;

        if first {
            *lock(&self.shared.state) = SupervisorState::Stopped;
            info!(block = %self.shared.label, "supervisor stopped");
        }
    }
}

impl Shared {
    async fn restart_generation(&self, generation: u64) {
        let mut procs = self.procs.lock().await;
        // Tasks may win the lock out of request order. A stale one arriving
        // after the newest must leave the newest generation's daemons alone.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(block = %self.label, generation, "restart superseded before it began");
            return;
        }
        self.stop_all(&mut procs).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(block = %self.label, generation, "restart superseded; skipping start");
            return;
        }
        if *lock(&self.state) != SupervisorState::Restarting {
            return;
        }

        info!(block = %self.label, generation, "restarting daemons");
        if let Err(err) = self.spawn_all(&mut procs) {
            error!(block = %self.label, generation, error = %err, "daemon restart failed");
        }

        let mut state = lock(&self.state);
        if *state == SupervisorState::Restarting
            && self.generation.load(Ordering::SeqCst) == generation
        {
            *state = SupervisorState::Running;
        }
    }

    fn spawn_all(&self, procs: &mut Vec<DaemonProcess>) -> Result<(), SupervisorError> {
        let launch = lock(&self.launch).clone();
        let mut first_err = None;

        for command in &launch.commands {
            match self.spawn_daemon(command, &launch.variables) {
                Ok(daemon) => procs.push(daemon),
                Err(err) => {
                    error!(block = %self.label, error = %err, "daemon spawn failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn spawn_daemon(
        &self,
        command: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<DaemonProcess, SupervisorError> {
        let mut cmd = shell_command(command, variables);
        // Own process group, so signals reach whatever the shell spawned too.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| SupervisorError::Spawn {
            command: command.to_string(),
            source,
        })?;
        let pid = child.id();
        info!(block = %self.label, cmd = %command, ?pid, "daemon started");

        let source = format!("{} daemon", self.label);
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, source.clone(), false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, source, false);
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(watch_daemon(
            self.label.clone(),
            command.to_string(),
            child,
            stop_rx,
            self.grace,
        ));

        Ok(DaemonProcess {
            command: command.to_string(),
            pid,
            stop: Some(stop_tx),
            handle,
        })
    }

    /// Signal every tracked daemon at once, then wait for all of them.
    async fn stop_all(&self, procs: &mut Vec<DaemonProcess>) {
        if procs.is_empty() {
            return;
        }
        for daemon in procs.iter_mut() {
            if let Some(stop) = daemon.stop.take() {
                // Fails only if the daemon already exited on its own.
                let _ = stop.send(());
            }
        }
        for daemon in procs.drain(..) {
            if let Err(err) = daemon.handle.await {
                warn!(block = %self.label, cmd = %daemon.command, error = %err, "daemon task failed");
            }
        }
    }
}

/// Own `child` until it exits by itself or a stop is requested.
async fn watch_daemon(
    label: String,
    command: String,
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    grace: Duration,
) {
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => warn!(
                block = %label,
                cmd = %command,
                exit_code = ?status.code(),
                "daemon exited; it will be restarted on the next relevant change"
            ),
            Err(err) => error!(block = %label, cmd = %command, error = %err, "waiting on daemon failed"),
        },
        _ = stop_rx => terminate(&label, &command, &mut child, grace).await,
    }
}

/// Graceful signal first, forceful kill once `grace` runs out.
async fn terminate(label: &str, command: &str, child: &mut Child, grace: Duration) {
    let Some(pid) = child.id() else {
        return;
    };

    send_terminate(pid, child);
    match timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(block = %label, cmd = %command, exit_code = ?status.code(), "daemon stopped");
        }
        Ok(Err(err)) => warn!(block = %label, cmd = %command, error = %err, "waiting on daemon failed"),
        Err(_) => {
            warn!(
                block = %label,
                cmd = %command,
                grace_ms = grace.as_millis() as u64,
                "daemon ignored SIGTERM; killing"
            );
            kill_group(pid);
            if let Err(err) = child.kill().await {
                warn!(block = %label, cmd = %command, error = %err, "failed to kill daemon");
            }
        }
    }
}

#[cfg(unix)]
fn send_terminate(pid: u32, _child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(err) = killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        debug!(pid, error = %err, "SIGTERM to process group failed");
    }
}

#[cfg(not(unix))]
fn send_terminate(_pid: u32, child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
