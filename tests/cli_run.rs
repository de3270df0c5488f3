// tests/cli_run.rs
#![cfg(unix)]
mod common;
use crate::common::{init_tracing, read_lines, with_timeout, TestResult};

use std::fs;

use clap::Parser;
use tempfile::TempDir;

use modwatch::cli::CliArgs;
use modwatch::errors::ModwatchError;
use modwatch::run;

#[test]
fn defaults_match_the_documented_flags() {
    let args = CliArgs::parse_from(["modwatch"]);
    assert_eq!(args.file, "./modwatch.toml");
    assert!(!args.noconf && !args.bell && !args.notify && !args.prep && !args.ignores);
    assert_eq!(args.lull_ms, 100);
    assert_eq!(args.grace_ms, 5000);
    assert!(args.log_level.is_none());

    let args = CliArgs::parse_from(["modwatch", "-f", "alt.toml", "-c", "-b", "-n", "--lull-ms", "250"]);
    assert_eq!(args.file, "alt.toml");
    assert!(args.noconf && args.bell && args.notify);
    assert_eq!(args.lull_ms, 250);
}

#[tokio::test]
async fn ignores_flag_exits_without_a_config() -> TestResult {
    let args = CliArgs::parse_from(["modwatch", "-i", "-f", "/does/not/exist.toml"]);
    with_timeout(run(args)).await?;
    Ok(())
}

#[tokio::test]
async fn missing_config_is_fatal() {
    let args = CliArgs::parse_from(["modwatch", "-p", "-f", "/does/not/exist.toml"]);
    assert!(with_timeout(run(args)).await.is_err());
}

#[tokio::test]
async fn prep_only_runs_once_and_reports_failures() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let marker = dir.path().join("ran.log");
    let config = dir.path().join("modwatch.toml");

    fs::write(
        &config,
        format!(
            "[[block]]\nprep = [\"echo ok >> {marker}\"]\ndaemon = [\"sleep 30\"]\n",
            marker = marker.display()
        ),
    )?;
    let args = CliArgs::parse_from(["modwatch", "-p", "-f", &config.display().to_string()]);
    with_timeout(run(args)).await?;
    assert_eq!(read_lines(&marker), ["ok"]);

    fs::write(
        &config,
        "[[block]]\nprep = [\"exit 1\"]\n\n[[block]]\nprep = [\"true\"]\n",
    )?;
    let args = CliArgs::parse_from(["modwatch", "-p", "-f", &config.display().to_string()]);
    match with_timeout(run(args)).await {
        Err(ModwatchError::PrepOnlyFailed(n)) => assert_eq!(n, 1),
        other => panic!("expected PrepOnlyFailed, got {other:?}"),
    }
    Ok(())
}
