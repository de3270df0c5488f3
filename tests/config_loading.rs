// tests/config_loading.rs
mod common;
use crate::common::{init_tracing, TestResult};

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use modwatch::config::{load_and_validate, load_and_validate_with, load_from_path, parse_str, Config};
use modwatch::engine::ConfigSnapshot;
use modwatch::errors::ModwatchError;
use modwatch::fs::mock::MockFileSystem;
use modwatch::watch::COMMON_EXCLUDES;
use modwatch_test_utils::builders::{BlockBuilder, ConfigBuilder};

fn write_config(contents: &str) -> Result<NamedTempFile, std::io::Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn full_config_is_parsed_and_vars_merged() -> TestResult {
    init_tracing();
    let file = write_config(
        r#"
[vars]
PORT = "8080"
MODE = "dev"

[[block]]
include = ["**/*.go"]
exclude = ["vendor/"]
prep = ["go test @dirmods"]
daemon = ["go run ./cmd/server"]

[[block]]
include = ["web/**"]
daemon = ["npm start"]
no_common_filter = true

[block.vars]
MODE = "web"
"#,
    )?;

    let raw = load_from_path(file.path())?;
    assert_eq!(raw.block.len(), 2);
    assert!(raw.block[0].vars.is_empty());

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.blocks().len(), 2);
    assert_eq!(cfg.vars().get("PORT").map(String::as_str), Some("8080"));

    let go = &cfg.blocks()[0];
    assert_eq!(go.index, 0);
    assert_eq!(go.label(), "block 1");
    assert_eq!(go.include, vec!["**/*.go"]);
    assert_eq!(go.exclude, vec!["vendor/"]);
    assert_eq!(go.prep, vec!["go test @dirmods"]);
    assert_eq!(go.daemon, vec!["go run ./cmd/server"]);
    assert!(!go.no_common_filter);
    assert_eq!(go.variables.get("MODE").map(String::as_str), Some("dev"));

    let web = &cfg.blocks()[1];
    assert!(web.prep.is_empty());
    assert!(web.no_common_filter);
    assert_eq!(web.variables.get("MODE").map(String::as_str), Some("web"));
    assert_eq!(web.variables.get("PORT").map(String::as_str), Some("8080"));

    assert_eq!(cfg.watch_patterns(), vec!["**/*.go", "web/**"]);
    Ok(())
}

#[test]
fn block_without_includes_watches_everything() -> TestResult {
    let cfg = ConfigBuilder::new()
        .with_block(BlockBuilder::new().prep("make").build())
        .build();
    assert!(cfg.blocks()[0].include.is_empty());
    assert_eq!(cfg.watch_patterns(), vec!["**"]);
    Ok(())
}

#[test]
fn config_without_blocks_is_rejected() {
    let err = Config::try_from(parse_str("[vars]\nA = \"1\"\n").unwrap()).unwrap_err();
    match err {
        ModwatchError::ConfigError(msg) => assert!(msg.contains("at least one")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn block_without_commands_is_rejected() {
    let raw = ConfigBuilder::new()
        .with_block(BlockBuilder::new().include("*.go").build())
        .raw();
    match Config::try_from(raw) {
        Err(ModwatchError::ConfigError(msg)) => {
            assert!(msg.contains("block 1"));
            assert!(msg.contains("neither prep nor daemon"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn blank_command_is_rejected() {
    let raw = ConfigBuilder::new()
        .with_block(BlockBuilder::new().prep("make").build())
        .with_block(BlockBuilder::new().daemon("   ").build())
        .raw();
    match Config::try_from(raw) {
        Err(ModwatchError::ConfigError(msg)) => assert!(msg.contains("block 2")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn bad_variable_names_are_rejected() {
    let global = ConfigBuilder::new()
        .with_var("1BAD", "x")
        .with_block(BlockBuilder::new().prep("make").build())
        .raw();
    assert!(matches!(Config::try_from(global), Err(ModwatchError::ConfigError(_))));

    let local = ConfigBuilder::new()
        .with_block(BlockBuilder::new().prep("make").var("WITH-DASH", "x").build())
        .raw();
    assert!(matches!(Config::try_from(local), Err(ModwatchError::ConfigError(_))));
}

#[test]
fn unknown_keys_are_a_toml_error() -> TestResult {
    let file = write_config("[[block]]\nprep = [\"make\"]\nwatch = [\"*.go\"]\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ModwatchError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let file = write_config("[[block]\nprep = \"make\"\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ModwatchError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_and_validate("/definitely/not/here/modwatch.toml").is_err());
}

#[test]
fn loads_through_the_filesystem_abstraction() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "./modwatch.toml",
        "[[block]]\ninclude = [\"*.py\"]\ndaemon = [\"python app.py\"]\n",
    );

    let cfg = load_and_validate_with(&fs, Path::new("./modwatch.toml"))?;
    assert_eq!(cfg.blocks()[0].include, vec!["*.py"]);

    assert!(load_and_validate_with(&fs, Path::new("./other.toml")).is_err());
    Ok(())
}

#[test]
fn snapshots_add_common_excludes_and_count_versions() {
    let cfg = ConfigBuilder::new()
        .with_block(BlockBuilder::new().exclude("tmp/").prep("make").build())
        .with_block(
            BlockBuilder::new()
                .prep("make")
                .no_common_filter(true)
                .build(),
        )
        .build();

    let first = ConfigSnapshot::initial(cfg.clone());
    assert_eq!(first.version(), 1);

    let filtered = &first.blocks()[0];
    assert_eq!(filtered.exclude[0], "tmp/");
    assert_eq!(filtered.exclude.len(), 1 + COMMON_EXCLUDES.len());
    assert!(filtered.exclude.iter().any(|p| p == "**/.git/"));

    assert!(first.blocks()[1].exclude.is_empty());

    // The source config is left untouched.
    assert_eq!(cfg.blocks()[0].exclude, vec!["tmp/"]);

    let second = first.next(cfg);
    assert_eq!(second.version(), 2);
    assert_eq!(first.version(), 1);
}
