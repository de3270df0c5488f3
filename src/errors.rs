// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Everything here is fatal to the process. Block-scoped failures have their
//! own types ([`crate::exec::PrepError`], [`crate::exec::SupervisorError`],
//! [`crate::filter::PatternError`]) and never surface as a `ModwatchError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Cannot watch {root}: {source}")]
    WatchRoot {
        root: String,
        #[source]
        source: notify::Error,
    },

    #[error("File watch subscription ended unexpectedly")]
    SubscriptionClosed,

    #[error("Prep commands failed in {0} block(s)")]
    PrepOnlyFailed(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ModwatchError>;
