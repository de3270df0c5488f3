// tests/watcher_live.rs
mod common;
use crate::common::{init_tracing, with_timeout, TestResult};

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use modwatch::watch::{spawn_watcher, ChangeKind, Mod};

const LULL: Duration = Duration::from_millis(100);

async fn next_batch_with(rx: &mut tokio::sync::mpsc::Receiver<Mod>, path: &str) -> Option<Mod> {
    while let Some(batch) = rx.recv().await {
        if batch.has(path) {
            return Some(batch);
        }
    }
    None
}

#[tokio::test]
async fn file_changes_arrive_as_relative_batches() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("src"))?;

    let (handle, mut rx) = spawn_watcher(dir.path(), &["**".to_string()], LULL)?;
    assert_eq!(handle.roots().len(), 1);

    fs::write(dir.path().join("src/main.go"), "package main")?;
    let batch = with_timeout(next_batch_with(&mut rx, "src/main.go"))
        .await
        .expect("batch for src/main.go");
    assert!(batch.paths().all(|p| !p.starts_with('/')));

    fs::remove_file(dir.path().join("src/main.go"))?;
    let batch = with_timeout(next_batch_with(&mut rx, "src/main.go"))
        .await
        .expect("batch for the deletion");
    assert!(
        batch
            .records()
            .iter()
            .any(|r| r.path == "src/main.go" && r.kind == ChangeKind::Deleted)
    );

    handle.stop();
    Ok(())
}

#[tokio::test]
async fn only_pattern_base_directories_are_watched() -> TestResult {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("api"))?;
    fs::create_dir_all(dir.path().join("web"))?;

    let patterns = vec!["api/**/*.go".to_string(), "web/*.js".to_string()];
    let (handle, _rx) = spawn_watcher(dir.path(), &patterns, LULL)?;

    let mut roots: Vec<_> = handle
        .roots()
        .iter()
        .filter_map(|r| r.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    roots.sort();
    assert_eq!(roots, vec!["api", "web"]);

    handle.stop();
    Ok(())
}

#[tokio::test]
async fn missing_watch_root_is_fatal() -> TestResult {
    let dir = TempDir::new()?;
    let result = spawn_watcher(dir.path(), &["missing/**".to_string()], LULL);
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn stopping_closes_the_batch_channel() -> TestResult {
    let dir = TempDir::new()?;
    let (handle, mut rx) = spawn_watcher(dir.path(), &["**".to_string()], LULL)?;

    handle.stop();
    let closed = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await?;
    assert!(closed.is_none());
    Ok(())
}
