// tests/run_reload.rs
//
// Kept to a single test: `run` watches the working directory, which is
// process-wide state.
#![cfg(unix)]
mod common;
use crate::common::{init_tracing, read_lines, wait_until, TestResult};

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tempfile::TempDir;

use modwatch::cli::CliArgs;
use modwatch::run;

/// One block whose daemon logs `start-<tag>` and `stop-<tag>`. The daemon
/// gives up on its own after a while so nothing outlives the test.
fn config_with_daemon(log: &Path, tag: &str) -> String {
    let daemon = format!(
        "trap 'echo stop-{tag} >> {log}; exit 0' TERM; echo start-{tag} >> {log}; \
         i=0; while [ $i -lt 600 ]; do sleep 0.05; i=$((i+1)); done",
        log = log.display()
    );
    format!("[[block]]\ninclude = [\"src/**\"]\ndaemon = [{daemon:?}]\n")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn config_reload_stops_old_daemons_before_starting_new_ones() -> TestResult {
    init_tracing();
    let work = TempDir::new()?;
    let logs = TempDir::new()?;
    let log = logs.path().join("daemon.log");

    fs::create_dir(work.path().join("src"))?;
    fs::write(work.path().join("modwatch.toml"), config_with_daemon(&log, "a"))?;
    std::env::set_current_dir(work.path())?;

    let args = CliArgs::parse_from(["modwatch", "--lull-ms", "50", "--grace-ms", "2000"]);
    let handle = tokio::spawn(run(args));

    assert!(
        wait_until(Duration::from_secs(5), || read_lines(&log) == ["start-a"]).await,
        "log: {:?}",
        read_lines(&log)
    );
    // The watcher subscribes after the daemons start.
    tokio::time::sleep(Duration::from_millis(300)).await;

    fs::write(work.path().join("modwatch.toml"), config_with_daemon(&log, "b"))?;

    let reloaded = wait_until(Duration::from_secs(10), || read_lines(&log).len() >= 3).await;
    let lines = read_lines(&log);
    let finished = handle.is_finished();
    handle.abort();

    assert!(reloaded, "log: {lines:?}");
    assert!(!finished, "run returned during reload");
    assert_eq!(lines, ["start-a", "stop-a", "start-b"]);
    Ok(())
}
