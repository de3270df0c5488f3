// src/config/loader.rs

use std::path::Path;

use crate::config::model::{Config, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Parse TOML text into a `RawConfigFile`, without validation.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks blocks and variable names, and merges `[vars]` into each block.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    load_and_validate_with(&RealFileSystem, path.as_ref())
}

/// [`load_and_validate`] over an arbitrary [`FileSystem`].
pub fn load_and_validate_with(fs: &dyn FileSystem, path: &Path) -> Result<Config> {
    let contents = fs.read_to_string(path)?;
    let raw = parse_str(&contents)?;
    Config::try_from(raw)
}
